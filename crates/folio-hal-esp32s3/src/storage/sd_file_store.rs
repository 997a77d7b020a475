use alloc::vec::Vec;

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};
use embedded_sdmmc::{Mode, SdCard, SdCardError, TimeSource, Timestamp, VolumeIdx, VolumeManager};
use folio_core::storage::{FileStore, StoreError, StoreErrorKind, file_name};
use log::{debug, info};

use crate::platform::spi::ExclusiveSpiDevice;

/// Largest file `read` will pull into memory.
pub const DEFAULT_MAX_FILE_BYTES: usize = 256 * 1024;

const READ_CHUNK: usize = 512;

/// Fixed timestamp source used until RTC time integration is added.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedTimeSource;

impl TimeSource for FixedTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        // 2026-01-01 00:00:00
        Timestamp {
            year_since_1970: 56,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

/// SD access error details.
#[derive(Debug)]
pub enum SdStoreError<BusErr, CsErr>
where
    BusErr: core::fmt::Debug,
    CsErr: core::fmt::Debug,
{
    ChipSelect(CsErr),
    Spi(BusErr),
    Card(SdCardError),
    Filesystem(embedded_sdmmc::Error<SdCardError>),
    TooLarge { bytes: u32 },
}

impl<BusErr, CsErr> StoreError for SdStoreError<BusErr, CsErr>
where
    BusErr: core::fmt::Debug,
    CsErr: core::fmt::Debug,
{
    fn kind(&self) -> StoreErrorKind {
        match self {
            Self::ChipSelect(_) | Self::Spi(_) | Self::Card(_) => StoreErrorKind::Unavailable,
            Self::Filesystem(
                embedded_sdmmc::Error::DeviceError(_)
                | embedded_sdmmc::Error::FormatError(_)
                | embedded_sdmmc::Error::NoSuchVolume,
            ) => StoreErrorKind::Unavailable,
            Self::Filesystem(_) => StoreErrorKind::Other,
            Self::TooLarge { bytes } => StoreErrorKind::TooLarge {
                bytes: *bytes as usize,
            },
        }
    }
}

struct DelayRef<'a, D>(&'a mut D);

impl<D> DelayNs for DelayRef<'_, D>
where
    D: DelayNs,
{
    fn delay_ns(&mut self, ns: u32) {
        self.0.delay_ns(ns);
    }
}

/// FAT root-directory file store on an SPI SD card.
///
/// Every call runs a complete card session (init, mount, open, close), so
/// a card swapped between calls is picked up and nothing stays open while
/// the device sleeps.
#[derive(Debug)]
pub struct SdFileStore<BUS, CS, DELAY> {
    bus: BUS,
    cs: CS,
    delay: DELAY,
    max_file_bytes: usize,
}

impl<BUS, CS, DELAY> SdFileStore<BUS, CS, DELAY>
where
    BUS: SpiBus<u8>,
    CS: OutputPin,
    DELAY: DelayNs,
    BUS::Error: core::fmt::Debug,
    CS::Error: core::fmt::Debug,
{
    pub fn new(bus: BUS, cs: CS, delay: DELAY) -> Self {
        Self {
            bus,
            cs,
            delay,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Releases owned bus, CS and delay.
    pub fn release(self) -> (BUS, CS, DELAY) {
        (self.bus, self.cs, self.delay)
    }

    /// Parks the bus with CS deasserted.
    pub fn park(&mut self) {
        let _ = self.bus.flush();
        let _ = self.cs.set_high();
    }

    /// Initializes the card and returns its capacity.
    pub fn probe(&mut self) -> Result<u64, SdStoreError<BUS::Error, CS::Error>> {
        self.preclock()?;

        let spi_device = ExclusiveSpiDevice::new(&mut self.bus, &mut self.cs);
        let mut delay_ref = DelayRef(&mut self.delay);
        let sd_card = SdCard::new(spi_device, &mut delay_ref);
        let card_size_bytes = sd_card.num_bytes().map_err(SdStoreError::Card)?;

        info!("sd: card detected bytes={}", card_size_bytes);
        Ok(card_size_bytes)
    }

    // SD SPI init requires >=74 clock cycles with CS deasserted.
    fn preclock(&mut self) -> Result<(), SdStoreError<BUS::Error, CS::Error>> {
        self.cs.set_high().map_err(SdStoreError::ChipSelect)?;
        let preclock = [0xFFu8; 10];
        self.bus.write(&preclock).map_err(SdStoreError::Spi)
    }
}

impl<BUS, CS, DELAY> FileStore for SdFileStore<BUS, CS, DELAY>
where
    BUS: SpiBus<u8>,
    CS: OutputPin,
    DELAY: DelayNs,
    BUS::Error: core::fmt::Debug,
    CS::Error: core::fmt::Debug,
{
    type Error = SdStoreError<BUS::Error, CS::Error>;

    fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        self.preclock()?;
        let max_file_bytes = self.max_file_bytes;

        let spi_device = ExclusiveSpiDevice::new(&mut self.bus, &mut self.cs);
        let mut delay_ref = DelayRef(&mut self.delay);
        let sd_card = SdCard::new(spi_device, &mut delay_ref);

        let mut volume_mgr = VolumeManager::new(sd_card, FixedTimeSource);
        let mut volume = volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(SdStoreError::Filesystem)?;
        let mut root_dir = volume.open_root_dir().map_err(SdStoreError::Filesystem)?;
        let mut file = match root_dir.open_file_in_dir(file_name(path), Mode::ReadOnly) {
            Ok(file) => file,
            Err(embedded_sdmmc::Error::NotFound) => {
                debug!("sd: not found path={}", path);
                return Ok(None);
            }
            Err(err) => return Err(SdStoreError::Filesystem(err)),
        };

        let length = file.length();
        if length as usize > max_file_bytes {
            return Err(SdStoreError::TooLarge { bytes: length });
        }

        let mut data = Vec::with_capacity(length as usize);
        let mut chunk = [0u8; READ_CHUNK];
        while !file.is_eof() {
            let read_now = file.read(&mut chunk).map_err(SdStoreError::Filesystem)?;
            if read_now == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read_now]);
        }

        file.close().map_err(SdStoreError::Filesystem)?;
        root_dir.close().map_err(SdStoreError::Filesystem)?;
        volume.close().map_err(SdStoreError::Filesystem)?;

        debug!("sd: read path={} bytes={}", path, data.len());
        Ok(Some(data))
    }

    fn overwrite(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error> {
        self.preclock()?;

        let spi_device = ExclusiveSpiDevice::new(&mut self.bus, &mut self.cs);
        let mut delay_ref = DelayRef(&mut self.delay);
        let sd_card = SdCard::new(spi_device, &mut delay_ref);

        let mut volume_mgr = VolumeManager::new(sd_card, FixedTimeSource);
        let mut volume = volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(SdStoreError::Filesystem)?;
        let mut root_dir = volume.open_root_dir().map_err(SdStoreError::Filesystem)?;
        let mut file = root_dir
            .open_file_in_dir(file_name(path), Mode::ReadWriteCreateOrTruncate)
            .map_err(SdStoreError::Filesystem)?;

        file.write(data).map_err(SdStoreError::Filesystem)?;

        file.close().map_err(SdStoreError::Filesystem)?;
        root_dir.close().map_err(SdStoreError::Filesystem)?;
        volume.close().map_err(SdStoreError::Filesystem)?;

        debug!("sd: wrote path={} bytes={}", path, data.len());
        Ok(())
    }
}
