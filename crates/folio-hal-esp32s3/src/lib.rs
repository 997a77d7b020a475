#![no_std]

//! ESP32-S3 board glue for the folio reader: SD file store, e-paper
//! screen, buttons and battery ADC.

extern crate alloc;

pub mod input {
    pub mod buttons;
}

pub mod platform {
    pub mod battery;
    pub mod display;
    pub mod spi;
}

pub mod storage {
    pub mod sd_file_store;
}
