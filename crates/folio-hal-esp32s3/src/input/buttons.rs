use embedded_hal::digital::InputPin;
use heapless::Deque;

use folio_core::input::{InputEvent, InputProvider};

#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    active_low: bool,
    debounce_polls: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_polls: 3,
        }
    }
}

impl ButtonConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }
}

#[derive(Debug)]
pub enum ButtonInputError<NextErr, PrevErr, MenuErr> {
    Next(NextErr),
    Prev(PrevErr),
    Menu(MenuErr),
}

type ButtonResult<NextErr, PrevErr, MenuErr, T> =
    Result<T, ButtonInputError<NextErr, PrevErr, MenuErr>>;

/// Debounce state for one button.
#[derive(Debug, Clone, Copy)]
struct Debounce {
    raw: bool,
    stable: bool,
    stable_count: u8,
}

impl Debounce {
    const fn new(pressed: bool) -> Self {
        Self {
            raw: pressed,
            stable: pressed,
            stable_count: 0,
        }
    }

    /// Feeds one sample. Returns `true` on a debounced press edge.
    fn update(&mut self, pressed: bool, threshold: u8) -> bool {
        if pressed == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = pressed;
            self.stable_count = 0;
        }

        if self.stable_count >= threshold.max(1) && self.stable != self.raw {
            self.stable = self.raw;
            return self.stable;
        }
        false
    }
}

/// Next/Prev/Menu push buttons, polled and debounced.
///
/// A button held at construction (the one that woke the device) does not
/// fire until it is released and pressed again.
#[derive(Debug)]
pub struct ButtonInput<NEXT, PREV, MENU> {
    next: NEXT,
    prev: PREV,
    menu: MENU,
    config: ButtonConfig,
    states: [Debounce; 3],
    pending: Deque<InputEvent, 3>,
}

impl<NEXT, PREV, MENU> ButtonInput<NEXT, PREV, MENU>
where
    NEXT: InputPin,
    PREV: InputPin,
    MENU: InputPin,
{
    pub fn new(
        mut next: NEXT,
        mut prev: PREV,
        mut menu: MENU,
        config: ButtonConfig,
    ) -> ButtonResult<NEXT::Error, PREV::Error, MENU::Error, Self> {
        let next_high = next.is_high().map_err(ButtonInputError::Next)?;
        let prev_high = prev.is_high().map_err(ButtonInputError::Prev)?;
        let menu_high = menu.is_high().map_err(ButtonInputError::Menu)?;

        Ok(Self {
            next,
            prev,
            menu,
            states: [
                Debounce::new(pressed_from_level(next_high, config.active_low)),
                Debounce::new(pressed_from_level(prev_high, config.active_low)),
                Debounce::new(pressed_from_level(menu_high, config.active_low)),
            ],
            config,
            pending: Deque::new(),
        })
    }

    fn sample(&mut self) -> ButtonResult<NEXT::Error, PREV::Error, MENU::Error, [bool; 3]> {
        let next_high = self.next.is_high().map_err(ButtonInputError::Next)?;
        let prev_high = self.prev.is_high().map_err(ButtonInputError::Prev)?;
        let menu_high = self.menu.is_high().map_err(ButtonInputError::Menu)?;

        let active_low = self.config.active_low;
        Ok([
            pressed_from_level(next_high, active_low),
            pressed_from_level(prev_high, active_low),
            pressed_from_level(menu_high, active_low),
        ])
    }
}

impl<NEXT, PREV, MENU> InputProvider for ButtonInput<NEXT, PREV, MENU>
where
    NEXT: InputPin,
    PREV: InputPin,
    MENU: InputPin,
{
    type Error = ButtonInputError<NEXT::Error, PREV::Error, MENU::Error>;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }

        let pressed = self.sample()?;
        let threshold = self.config.debounce_polls;
        for ((state, pressed), event) in self.states.iter_mut().zip(pressed).zip(InputEvent::ALL) {
            if state.update(pressed, threshold) {
                let _ = self.pending.push_back(event);
            }
        }

        Ok(self.pending.pop_front())
    }
}

#[inline]
fn pressed_from_level(high: bool, active_low: bool) -> bool {
    if active_low { !high } else { high }
}
