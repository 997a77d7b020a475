// Battery voltage estimation
//
// The cell is read through a resistor divider, so the pin sees a fraction
// of the cell voltage. Percentage is a linear map between the profile's
// empty and full voltages.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BatteryProfile {
    pub full_mv: u16,
    pub empty_mv: u16,
    /// Cell voltage / pin voltage.
    pub divider: u8,
    pub reference_mv: u16,
    pub adc_full_scale: u16,
}

impl Default for BatteryProfile {
    fn default() -> Self {
        Self {
            full_mv: 4200,
            empty_mv: 0,
            divider: 2,
            reference_mv: 3300,
            adc_full_scale: 4096,
        }
    }
}

impl BatteryProfile {
    pub const fn with_full_mv(mut self, full_mv: u16) -> Self {
        self.full_mv = full_mv;
        self
    }

    pub const fn with_empty_mv(mut self, empty_mv: u16) -> Self {
        self.empty_mv = empty_mv;
        self
    }

    pub const fn with_divider(mut self, divider: u8) -> Self {
        self.divider = divider;
        self
    }

    /// Raw ADC count to pin millivolts.
    pub fn raw_to_pin_mv(&self, raw: u16) -> u16 {
        let full_scale = self.adc_full_scale.max(1) as u32;
        (raw as u32 * self.reference_mv as u32 / full_scale).min(u16::MAX as u32) as u16
    }

    pub fn pin_to_battery_mv(&self, pin_mv: u16) -> u16 {
        (pin_mv as u32 * self.divider.max(1) as u32).min(u16::MAX as u32) as u16
    }

    pub fn percentage(&self, battery_mv: u16) -> u8 {
        let mv = battery_mv as u32;
        let full = self.full_mv as u32;
        let empty = self.empty_mv as u32;
        if mv >= full {
            100
        } else if mv <= empty {
            0
        } else {
            ((mv - empty) * 100 / (full - empty)) as u8
        }
    }

    pub fn percentage_from_raw(&self, raw: u16) -> u8 {
        self.percentage(self.pin_to_battery_mv(self.raw_to_pin_mv(raw)))
    }
}
