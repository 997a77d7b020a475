use alloc::{collections::BTreeMap, string::String, vec::Vec};

use super::{FileStore, StoreError, StoreErrorKind, file_name};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MemoryStoreError {
    ReadFailed,
    WriteFailed,
    TooLarge { bytes: usize },
}

impl StoreError for MemoryStoreError {
    fn kind(&self) -> StoreErrorKind {
        match self {
            Self::ReadFailed => StoreErrorKind::Unavailable,
            Self::WriteFailed => StoreErrorKind::Other,
            Self::TooLarge { bytes } => StoreErrorKind::TooLarge { bytes: *bytes },
        }
    }
}

/// In-memory file store used by tests and hardware-less bring-up.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: BTreeMap<String, Vec<u8>>,
    fail_reads: bool,
    fail_writes: bool,
    max_file_bytes: Option<usize>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, data: &[u8]) -> Self {
        self.insert(path, data);
        self
    }

    /// Rejects reads of files longer than `max_file_bytes`.
    pub fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = Some(max_file_bytes);
        self
    }

    pub fn insert(&mut self, path: &str, data: &[u8]) {
        self.files.insert(String::from(file_name(path)), data.to_vec());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(file_name(path)).map(Vec::as_slice)
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful overwrites since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl FileStore for MemoryStore {
    type Error = MemoryStoreError;

    fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        if self.fail_reads {
            return Err(MemoryStoreError::ReadFailed);
        }
        match self.files.get(file_name(path)) {
            Some(data) if self.max_file_bytes.is_some_and(|max| data.len() > max) => {
                Err(MemoryStoreError::TooLarge { bytes: data.len() })
            }
            data => Ok(data.cloned()),
        }
    }

    fn overwrite(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MemoryStoreError::WriteFailed);
        }
        self.insert(path, data);
        self.writes += 1;
        Ok(())
    }
}
