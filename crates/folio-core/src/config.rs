//! Reader and board configuration.
//!
//! Board variants differ only in panel geometry, wiring and battery
//! constants, so each one is a [`BoardProfile`] value rather than a
//! separate firmware.

use crate::{
    battery::BatteryProfile,
    book::PageCountConvention,
    power::{DEFAULT_IDLE_TIMEOUT_MS, SleepMode},
    render::{Layout, Orientation},
};

/// One selectable book: its id inside the index file and where things live.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BookSpec {
    pub id: &'static str,
    /// 8.3 name of the JSON index file.
    pub file: &'static str,
    /// 8.3 name of the progress record.
    pub progress_file: &'static str,
}

impl BookSpec {
    pub const fn new(id: &'static str, file: &'static str, progress_file: &'static str) -> Self {
        Self {
            id,
            file,
            progress_file,
        }
    }
}

pub const DEFAULT_BOOKS: &[BookSpec] = &[BookSpec::new("Beyond-Order", "BOOK.JSN", "PROGRESS.TXT")];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReaderConfig {
    pub books: &'static [BookSpec],
    pub page_count: PageCountConvention,
    pub idle_timeout_ms: u64,
    pub sleep_mode: SleepMode,
    pub max_chars_per_line: u16,
    pub line_height: u16,
    pub margin: u16,
    pub battery_refresh_ms: u64,
    /// Draw a status frame before sleeping.
    pub sleep_notice: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            books: DEFAULT_BOOKS,
            page_count: PageCountConvention::RecordCount,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            sleep_mode: SleepMode::Deep,
            max_chars_per_line: 30,
            line_height: 16,
            margin: 10,
            battery_refresh_ms: 60_000,
            sleep_notice: true,
        }
    }
}

impl ReaderConfig {
    pub const fn with_books(mut self, books: &'static [BookSpec]) -> Self {
        self.books = books;
        self
    }

    pub const fn with_page_count(mut self, page_count: PageCountConvention) -> Self {
        self.page_count = page_count;
        self
    }

    pub const fn with_idle_timeout_ms(mut self, idle_timeout_ms: u64) -> Self {
        self.idle_timeout_ms = idle_timeout_ms;
        self
    }

    pub const fn with_sleep_mode(mut self, sleep_mode: SleepMode) -> Self {
        self.sleep_mode = sleep_mode;
        self
    }

    pub const fn with_sleep_notice(mut self, sleep_notice: bool) -> Self {
        self.sleep_notice = sleep_notice;
        self
    }

    pub fn layout(&self, panel: &PanelProfile, orientation: Orientation, text_size: u8) -> Layout {
        Layout::new(panel.width, panel.height, orientation)
            .with_margin(self.margin)
            .with_line_height(self.line_height)
            .with_max_chars_per_line(self.max_chars_per_line)
            .with_text_size(text_size)
    }
}

/// Native (portrait) panel geometry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PanelProfile {
    pub width: u16,
    pub height: u16,
    pub orientation: Orientation,
}

impl PanelProfile {
    pub const GDEH029A1: Self = Self {
        width: 128,
        height: 296,
        orientation: Orientation::Landscape,
    };
}

/// GPIO numbers; buttons are active low.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PinMap {
    pub next: u8,
    pub prev: u8,
    pub menu: u8,
    pub sd_cs: u8,
    pub sd_sck: u8,
    pub sd_mosi: u8,
    pub sd_miso: u8,
    pub epd_cs: u8,
    pub epd_dc: u8,
    pub epd_rst: u8,
    pub epd_busy: u8,
    pub epd_sck: u8,
    pub epd_mosi: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BoardProfile {
    pub name: &'static str,
    pub panel: PanelProfile,
    pub pins: PinMap,
    pub battery: BatteryProfile,
}

impl BoardProfile {
    /// First build: buttons on 12/13/14, panel control on 17/16/4.
    pub const REV_A: Self = Self {
        name: "rev-a",
        panel: PanelProfile::GDEH029A1,
        pins: PinMap {
            next: 12,
            prev: 13,
            menu: 14,
            sd_cs: 5,
            sd_sck: 6,
            sd_mosi: 7,
            sd_miso: 8,
            epd_cs: 10,
            epd_dc: 17,
            epd_rst: 16,
            epd_busy: 4,
            epd_sck: 18,
            epd_mosi: 11,
        },
        battery: BatteryProfile {
            full_mv: 4200,
            empty_mv: 0,
            divider: 2,
            reference_mv: 3300,
            adc_full_scale: 4096,
        },
    };

    /// Driver-board wiring with a 4.7 V pack.
    pub const REV_B: Self = Self {
        name: "rev-b",
        panel: PanelProfile::GDEH029A1,
        pins: PinMap {
            next: 12,
            prev: 13,
            menu: 14,
            sd_cs: 5,
            sd_sck: 6,
            sd_mosi: 7,
            sd_miso: 8,
            epd_cs: 15,
            epd_dc: 9,
            epd_rst: 46,
            epd_busy: 3,
            epd_sck: 21,
            epd_mosi: 47,
        },
        battery: BatteryProfile {
            full_mv: 4700,
            empty_mv: 0,
            divider: 2,
            reference_mv: 3300,
            adc_full_scale: 4096,
        },
    };

    /// Wake lines in `InputEvent::ALL` order.
    pub const fn button_pins(&self) -> [u8; 3] {
        [self.pins.next, self.pins.prev, self.pins.menu]
    }
}
