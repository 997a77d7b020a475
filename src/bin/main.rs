#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

extern crate alloc;

use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{AnyPin, Input, InputConfig, Level, Output, OutputConfig, Pull},
    rtc_cntl::{SocResetReason, reset_reason, wakeup_cause},
    spi::master::Spi,
    system::Cpu,
    time::{Instant, Rate},
    timer::timg::TimerGroup,
};
use folio_core::{
    app::ReaderApp,
    book,
    config::{BoardProfile, ReaderConfig},
};
use folio_hal_esp32s3::{
    input::buttons::{ButtonConfig, ButtonInput},
    platform::{battery::BatteryMonitor, display::EpdScreen, spi::ExclusiveSpiDevice},
    storage::sd_file_store::SdFileStore,
};
use gdeh029a1::Gdeh029a1;
use log::{LevelFilter, error, info, warn};

use power::BoardSleep;

#[path = "main/power.rs"]
mod power;

const EPD_SPI_HZ: u32 = 4_000_000;
const SD_SPI_HZ: u32 = 1_000_000;
const SD_PROBE_ATTEMPTS: u8 = 3;
const SD_PROBE_RETRY_DELAY_MS: u64 = 120;
const MAX_BOOK_BYTES: usize = 160 * 1024;
const BUTTON_DEBOUNCE_POLLS: u8 = 3;
const POLL_INTERVAL_MS: u64 = 5;

#[cfg(feature = "rev-b")]
const BOARD: BoardProfile = BoardProfile::REV_B;
#[cfg(not(feature = "rev-b"))]
const BOARD: BoardProfile = BoardProfile::REV_A;

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

fn halt(reason: &str) -> ! {
    error!("boot: halted: {}", reason);
    loop {
        core::hint::spin_loop();
    }
}

/// Claims a GPIO named by the board profile.
fn board_pin(number: u8) -> AnyPin<'static> {
    // SAFETY: every profile pin number is distinct and claimed exactly once
    // below; the matching typed peripherals are never touched.
    unsafe { AnyPin::steal(number) }
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: folio starting board={}", BOARD.name);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    let boot_reset_reason = reset_reason(Cpu::ProCpu);
    let woke_from_deep_sleep = boot_reset_reason == Some(SocResetReason::CoreDeepSleep);
    info!(
        "boot reset_reason={:?} wakeup_cause={:?} deep_sleep_wake={}",
        boot_reset_reason,
        wakeup_cause(),
        woke_from_deep_sleep
    );

    // The whole book index is held in memory while a book is open.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);
    esp_alloc::heap_allocator!(size: 192 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let pins = BOARD.pins;

    let input_cfg = InputConfig::default().with_pull(Pull::Up);
    let Ok(mut buttons) = ButtonInput::new(
        Input::new(board_pin(pins.next), input_cfg),
        Input::new(board_pin(pins.prev), input_cfg),
        Input::new(board_pin(pins.menu), input_cfg),
        ButtonConfig::default().with_debounce_polls(BUTTON_DEBOUNCE_POLLS),
    ) else {
        halt("button inputs unreadable");
    };

    let sd_cs = Output::new(board_pin(pins.sd_cs), Level::High, OutputConfig::default());
    let sd_spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(SD_SPI_HZ))
        // SD cards in SPI mode use CPOL=0, CPHA=0.
        .with_mode(esp_hal::spi::Mode::_0);
    let Ok(sd_spi) = Spi::new(peripherals.SPI3, sd_spi_config) else {
        halt("sd spi config rejected");
    };
    let sd_spi = sd_spi
        .with_sck(board_pin(pins.sd_sck))
        .with_mosi(board_pin(pins.sd_mosi))
        .with_miso(board_pin(pins.sd_miso));
    let mut store =
        SdFileStore::new(sd_spi, sd_cs, Delay::new()).with_max_file_bytes(MAX_BOOK_BYTES);

    for attempt in 1..=SD_PROBE_ATTEMPTS {
        match store.probe() {
            Ok(_) => break,
            Err(err) => {
                warn!("sd: probe attempt={} failed err={:?}", attempt, err);
                Timer::after_millis(SD_PROBE_RETRY_DELAY_MS).await;
            }
        }
    }
    store.park();

    let epd_cs = Output::new(board_pin(pins.epd_cs), Level::High, OutputConfig::default());
    let epd_dc = Output::new(board_pin(pins.epd_dc), Level::Low, OutputConfig::default());
    let epd_rst = Output::new(board_pin(pins.epd_rst), Level::High, OutputConfig::default());
    let epd_busy = Input::new(board_pin(pins.epd_busy), InputConfig::default());
    let epd_spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(EPD_SPI_HZ))
        .with_mode(esp_hal::spi::Mode::_0);
    let Ok(epd_spi) = Spi::new(peripherals.SPI2, epd_spi_config) else {
        halt("display spi config rejected");
    };
    let epd_spi = epd_spi
        .with_sck(board_pin(pins.epd_sck))
        .with_mosi(board_pin(pins.epd_mosi));
    let epd = Gdeh029a1::new(
        ExclusiveSpiDevice::new(epd_spi, epd_cs),
        epd_dc,
        epd_rst,
        epd_busy,
        gdeh029a1::Config {
            spi_hz: EPD_SPI_HZ,
            ..gdeh029a1::Config::default()
        },
    );
    let screen = EpdScreen::new(epd, Delay::new());

    // Battery divider sits on GPIO1 (ADC1 channel 0) on every revision.
    let mut battery = BatteryMonitor::new(peripherals.ADC1, peripherals.GPIO1, BOARD.battery);

    info!(
        "Board pins: next={} prev={} menu={} sd_cs={} epd_cs={} epd_busy={}",
        pins.next, pins.prev, pins.menu, pins.sd_cs, pins.epd_cs, pins.epd_busy
    );

    let boot_start = Instant::now();
    let now_ms = || boot_start.elapsed().as_millis();

    let reader_config = ReaderConfig::default();
    let mut app = ReaderApp::new(store, screen, reader_config, BOARD.panel, now_ms());

    match battery.read_percent() {
        Ok(percent) => app.set_battery_percent(percent, now_ms()),
        Err(err) => warn!("battery: read failed err={:?}", err),
    }

    match app.boot() {
        Ok(result) => info!(
            "book: opened id={:?} pages={} result={:?}",
            app.book_id(),
            app.total_pages(),
            result
        ),
        Err(err) => error!("book: boot failed: {} ({})", book::describe(&err), err),
    }

    let mut sleeper = BoardSleep::new(pins);

    loop {
        let now = now_ms();
        app.process_inputs(&mut buttons, now);

        if app.battery_sample_due(now) {
            match battery.read_percent() {
                Ok(percent) => app.set_battery_percent(percent, now),
                Err(err) => warn!("battery: read failed err={:?}", err),
            }
        }

        app.poll_power(now_ms(), &mut sleeper);

        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}
