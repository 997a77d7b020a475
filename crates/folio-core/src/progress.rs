//! Persisted reading position.
//!
//! The record is the decimal text of the 0-based page index and nothing
//! else. Writes replace the whole file; anything that does not parse back
//! to an index is treated as no record at all.

use core::fmt::Write;

use heapless::String;
use log::warn;

use crate::storage::FileStore;

/// Enough digits for any `u64`.
pub const RECORD_CAPACITY: usize = 20;

/// Abstract progress persistence backend.
pub trait ProgressStore {
    type Error: core::fmt::Debug;

    fn load(&mut self) -> Result<Option<usize>, Self::Error>;
    fn save(&mut self, page: usize) -> Result<(), Self::Error>;
}

/// Progress record kept as a small file next to the book.
#[derive(Debug)]
pub struct FileProgress<'a, FS> {
    store: &'a mut FS,
    path: &'a str,
}

impl<'a, FS> FileProgress<'a, FS>
where
    FS: FileStore,
{
    pub fn new(store: &'a mut FS, path: &'a str) -> Self {
        Self { store, path }
    }
}

impl<FS> ProgressStore for FileProgress<'_, FS>
where
    FS: FileStore,
{
    type Error = FS::Error;

    fn load(&mut self) -> Result<Option<usize>, Self::Error> {
        let Some(bytes) = self.store.read(self.path)? else {
            return Ok(None);
        };

        let page = decode(&bytes);
        if page.is_none() {
            warn!(
                "progress: unparsable record path={} bytes={}",
                self.path,
                bytes.len()
            );
        }
        Ok(page)
    }

    fn save(&mut self, page: usize) -> Result<(), Self::Error> {
        self.store.overwrite(self.path, encode(page).as_bytes())
    }
}

pub fn encode(page: usize) -> String<RECORD_CAPACITY> {
    let mut out = String::new();
    // Cannot overflow: usize has at most 20 decimal digits.
    let _ = write!(out, "{page}");
    out
}

pub fn decode(bytes: &[u8]) -> Option<usize> {
    core::str::from_utf8(bytes).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const PATH: &str = "/PROGRESS.TXT";

    #[test]
    fn save_then_load_round_trips() {
        let mut store = MemoryStore::new();
        let mut progress = FileProgress::new(&mut store, PATH);

        for page in [0, 1, 9, 10, 22, 4_096] {
            progress.save(page).unwrap();
            assert_eq!(progress.load().unwrap(), Some(page));
        }
    }

    #[test]
    fn record_is_plain_decimal() {
        let mut store = MemoryStore::new();
        FileProgress::new(&mut store, PATH).save(137).unwrap();

        assert_eq!(store.get(PATH), Some(&b"137"[..]));
    }

    #[test]
    fn missing_record_is_absent() {
        let mut store = MemoryStore::new();

        assert_eq!(FileProgress::new(&mut store, PATH).load().unwrap(), None);
    }

    #[test]
    fn garbage_record_is_absent() {
        let records: [&[u8]; 5] = [b"", b"abc", b"-3", b"12x", &[0xff, 0xfe]];
        for record in records {
            let mut store = MemoryStore::new().with_file(PATH, record);
            assert_eq!(
                FileProgress::new(&mut store, PATH).load().unwrap(),
                None,
                "record {record:?}"
            );
        }
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(decode(b" 42\r\n"), Some(42));
    }

    #[test]
    fn write_failure_surfaces_store_error() {
        let mut store = MemoryStore::new();
        store.set_fail_writes(true);

        assert!(FileProgress::new(&mut store, PATH).save(3).is_err());
    }

    #[test]
    fn encode_handles_largest_index() {
        assert_eq!(encode(usize::MAX).len(), usize::MAX.to_string().len());
    }
}
