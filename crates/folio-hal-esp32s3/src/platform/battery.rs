use esp_hal::{
    Blocking,
    analog::adc::{Adc, AdcChannel, AdcConfig, AdcPin, Attenuation},
    gpio::AnalogPin,
    peripherals::ADC1,
};
use folio_core::battery::BatteryProfile;
use log::debug;

/// Oneshot conversion did not complete.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AdcReadError;

/// Battery sense input on ADC1 behind the board's divider.
pub struct BatteryMonitor<'d, PIN> {
    adc: Adc<'d, ADC1<'d>, Blocking>,
    pin: AdcPin<PIN, ADC1<'d>>,
    profile: BatteryProfile,
}

impl<'d, PIN> BatteryMonitor<'d, PIN>
where
    PIN: AdcChannel + AnalogPin,
{
    pub fn new(adc1: ADC1<'d>, pin: PIN, profile: BatteryProfile) -> Self {
        let mut adc_cfg = AdcConfig::new();
        // 11 dB covers the full 0..3.3 V pin range.
        let pin = adc_cfg.enable_pin(pin, Attenuation::_11dB);
        let adc = Adc::new(adc1, adc_cfg);

        Self { adc, pin, profile }
    }

    pub fn read_raw(&mut self) -> Result<u16, AdcReadError> {
        nb::block!(self.adc.read_oneshot(&mut self.pin)).map_err(|()| AdcReadError)
    }

    /// Samples once and converts through the profile.
    pub fn read_percent(&mut self) -> Result<u8, AdcReadError> {
        let raw = self.read_raw()?;
        let percent = self.profile.percentage_from_raw(raw);
        debug!("battery: raw={} percent={}", raw, percent);
        Ok(percent)
    }
}
