//! Command set and RAM addressing for the GDEH029A1 (IL3820/SSD16xx class).

/// Panel width in pixels (source lines).
pub const WIDTH: usize = 128;
/// Panel height in pixels (gate lines).
pub const HEIGHT: usize = 296;
/// Number of bytes in one gate line.
pub const LINE_BYTES: usize = WIDTH / 8;
/// Total framebuffer size in bytes.
pub const BUFFER_SIZE: usize = LINE_BYTES * HEIGHT;

/// Controller command bytes.
pub mod cmd {
    pub const DRIVER_OUTPUT_CTRL: u8 = 0x01;
    pub const BOOSTER_SOFT_START: u8 = 0x0C;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const MASTER_ACTIVATE: u8 = 0x20;
    pub const DISPLAY_UPDATE_CTRL2: u8 = 0x22;
    pub const WRITE_BW_DATA: u8 = 0x24;
    pub const WRITE_VCOM_REG: u8 = 0x2C;
    pub const WRITE_LUT_REG: u8 = 0x32;
    pub const DUMMY_LINE_PERIOD: u8 = 0x3A;
    pub const GATE_LINE_WIDTH: u8 = 0x3B;
    pub const BORDER_WAVEFORM_CTRL: u8 = 0x3C;
    pub const SET_RAMXPOS: u8 = 0x44;
    pub const SET_RAMYPOS: u8 = 0x45;
    pub const SET_RAMX_COUNTER: u8 = 0x4E;
    pub const SET_RAMY_COUNTER: u8 = 0x4F;
    pub const NOP: u8 = 0xFF;
}

/// X increments, then Y.
pub const DATA_ENTRY_INCREMENT: u8 = 0x03;
/// Clock on, analog on, run the LUT, analog off, clock off.
pub const UPDATE_SEQUENCE_FULL: u8 = 0xC4;
/// Deep sleep mode 1: RAM retained, BUSY released.
pub const DEEP_SLEEP_MODE_1: u8 = 0x01;

/// Full-refresh waveform.
pub const LUT_FULL_UPDATE: [u8; 30] = [
    0x02, 0x02, 0x01, 0x11, 0x12, 0x12, 0x22, 0x22, 0x66, 0x69, 0x69, 0x59, 0x58, 0x99, 0x99,
    0x88, 0x00, 0x00, 0x00, 0x00, 0xF8, 0xB4, 0x13, 0x51, 0x35, 0x51, 0x51, 0x19, 0x01, 0x00,
];

const DRIVER_OUTPUT: [u8; 3] = driver_output_data(HEIGHT as u16);

/// Register writes issued after a software reset, in order.
pub const INIT_SEQUENCE: &[(u8, &[u8])] = &[
    (cmd::DRIVER_OUTPUT_CTRL, &DRIVER_OUTPUT),
    (cmd::BOOSTER_SOFT_START, &[0xD7, 0xD6, 0x9D]),
    (cmd::WRITE_VCOM_REG, &[0xA8]),
    (cmd::DUMMY_LINE_PERIOD, &[0x1A]),
    (cmd::GATE_LINE_WIDTH, &[0x08]),
    (cmd::BORDER_WAVEFORM_CTRL, &[0x03]),
    (cmd::DATA_ENTRY_MODE, &[DATA_ENTRY_INCREMENT]),
    (cmd::WRITE_LUT_REG, &LUT_FULL_UPDATE),
];

/// `DRIVER_OUTPUT_CTRL` payload for `gates` gate lines.
///
/// The gate count is a 9-bit field stored as `gates - 1`, low byte first.
pub const fn driver_output_data(gates: u16) -> [u8; 3] {
    let last = gates.saturating_sub(1);
    [(last & 0xFF) as u8, ((last >> 8) & 0x01) as u8, 0x00]
}

/// `SET_RAMXPOS` payload. X is addressed in bytes.
pub const fn ram_x_window(x_start: u16, x_end: u16) -> [u8; 2] {
    [(x_start / 8) as u8, (x_end / 8) as u8]
}

/// `SET_RAMYPOS` payload, low byte first.
pub const fn ram_y_window(y_start: u16, y_end: u16) -> [u8; 4] {
    [
        (y_start & 0xFF) as u8,
        (y_start >> 8) as u8,
        (y_end & 0xFF) as u8,
        (y_end >> 8) as u8,
    ]
}

/// `SET_RAMY_COUNTER` payload.
pub const fn ram_y_counter(y: u16) -> [u8; 2] {
    [(y & 0xFF) as u8, (y >> 8) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_matches_panel_geometry() {
        assert_eq!(LINE_BYTES, 16);
        assert_eq!(BUFFER_SIZE, 4_736);
    }

    #[test]
    fn driver_output_encodes_nine_bit_gate_count() {
        assert_eq!(driver_output_data(296), [0x27, 0x01, 0x00]);
        assert_eq!(driver_output_data(250), [0xF9, 0x00, 0x00]);
        assert_eq!(driver_output_data(0), [0x00, 0x00, 0x00]);
    }

    #[test]
    fn ram_windows_cover_full_panel() {
        assert_eq!(ram_x_window(0, WIDTH as u16 - 1), [0x00, 0x0F]);
        assert_eq!(ram_y_window(0, HEIGHT as u16 - 1), [0x00, 0x00, 0x27, 0x01]);
        assert_eq!(ram_y_counter(0x127), [0x27, 0x01]);
    }

    #[test]
    fn init_sequence_loads_waveform_last() {
        let (first, data) = INIT_SEQUENCE[0];
        assert_eq!(first, cmd::DRIVER_OUTPUT_CTRL);
        assert_eq!(data, &[0x27, 0x01, 0x00]);

        let (last, lut) = INIT_SEQUENCE[INIT_SEQUENCE.len() - 1];
        assert_eq!(last, cmd::WRITE_LUT_REG);
        assert_eq!(lut.len(), 30);
    }
}
