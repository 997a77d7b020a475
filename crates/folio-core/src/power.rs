//! Power/interaction state machine.
//!
//! The device is `Active` until no button has been accepted for the idle
//! timeout, then `Sleeping` until a button wakes it. Nothing renders or
//! persists while sleeping.

use log::info;

use crate::input::InputEvent;

pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowerState {
    Active,
    Sleeping,
}

/// How the target sleeps. Deep sleep restarts the program on wake.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SleepMode {
    Light,
    #[default]
    Deep,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowerAction {
    Stay,
    EnterSleep(SleepMode),
    /// First poll after a light sleep returned.
    Woke,
}

/// Sleep entry and wake-source arming.
pub trait SleepController {
    /// Halts until one of `wake_on` is pressed. Deep sleep does not return.
    fn enter_sleep(&mut self, mode: SleepMode, wake_on: &[InputEvent]);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PowerMachine {
    state: PowerState,
    mode: SleepMode,
    idle_timeout_ms: u64,
    last_interaction_ms: u64,
}

impl PowerMachine {
    pub const fn new(now_ms: u64, idle_timeout_ms: u64, mode: SleepMode) -> Self {
        Self {
            state: PowerState::Active,
            mode,
            idle_timeout_ms,
            last_interaction_ms: now_ms,
        }
    }

    pub const fn state(&self) -> PowerState {
        self.state
    }

    pub const fn is_sleeping(&self) -> bool {
        matches!(self.state, PowerState::Sleeping)
    }

    pub const fn mode(&self) -> SleepMode {
        self.mode
    }

    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_interaction_ms)
    }

    /// Records an accepted button press. Returns `true` when it woke the device.
    pub fn on_input(&mut self, now_ms: u64) -> bool {
        let woke = self.is_sleeping();
        if woke {
            info!("power: wake by input");
        }
        self.state = PowerState::Active;
        self.last_interaction_ms = now_ms;
        woke
    }

    pub fn poll(&mut self, now_ms: u64) -> PowerAction {
        match self.state {
            PowerState::Sleeping => {
                self.wake(now_ms);
                PowerAction::Woke
            }
            PowerState::Active if self.sleep_due(now_ms) => {
                info!(
                    "power: idle {}ms, entering {:?} sleep",
                    self.idle_ms(now_ms),
                    self.mode
                );
                self.state = PowerState::Sleeping;
                PowerAction::EnterSleep(self.mode)
            }
            PowerState::Active => PowerAction::Stay,
        }
    }

    /// Idle long enough that the next `poll` enters sleep.
    pub fn sleep_due(&self, now_ms: u64) -> bool {
        !self.is_sleeping() && self.idle_ms(now_ms) >= self.idle_timeout_ms
    }

    pub fn wake(&mut self, now_ms: u64) {
        self.state = PowerState::Active;
        self.last_interaction_ms = now_ms;
    }
}
