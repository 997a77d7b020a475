use esp_hal::{
    gpio::{AnyPin, RtcPin},
    peripherals::LPWR,
    rtc_cntl::{
        Rtc,
        sleep::{RtcioWakeupSource, WakeupLevel},
    },
};
use folio_core::{
    config::PinMap,
    input::InputEvent,
    power::{SleepController, SleepMode},
};
use heapless::Vec as HeaplessVec;
use log::info;

/// Arms the buttons as active-low RTC wake sources and sleeps the SoC.
///
/// The panel parks itself after every refresh and the SD store closes the
/// card after every call, so nothing else needs quiescing here.
pub(super) struct BoardSleep {
    pins: PinMap,
}

impl BoardSleep {
    pub(super) const fn new(pins: PinMap) -> Self {
        Self { pins }
    }

    fn gpio_for(&self, event: InputEvent) -> u8 {
        match event {
            InputEvent::Next => self.pins.next,
            InputEvent::Prev => self.pins.prev,
            InputEvent::Menu => self.pins.menu,
        }
    }
}

impl SleepController for BoardSleep {
    fn enter_sleep(&mut self, mode: SleepMode, wake_on: &[InputEvent]) {
        // SAFETY: the button inputs are only sampled from the main loop,
        // which is blocked here until wake.
        let mut wake_gpios: HeaplessVec<AnyPin<'static>, 3> = wake_on
            .iter()
            .take(3)
            .map(|event| unsafe { AnyPin::steal(self.gpio_for(*event)) })
            .collect();
        let mut wake_pins: HeaplessVec<(&mut dyn RtcPin, WakeupLevel), 3> = wake_gpios
            .iter_mut()
            .map(|pin| (pin as &mut dyn RtcPin, WakeupLevel::Low))
            .collect();
        let wake_source = RtcioWakeupSource::new(wake_pins.as_mut_slice());

        let mut rtc = Rtc::new(unsafe { LPWR::steal() });
        match mode {
            SleepMode::Deep => {
                info!("power: deep sleep, wake pins={}", wake_on.len());
                rtc.sleep_deep(&[&wake_source]);
            }
            SleepMode::Light => {
                info!("power: light sleep, wake pins={}", wake_on.len());
                rtc.sleep_light(&[&wake_source]);
                info!("power: light sleep returned");
            }
        }
    }
}
