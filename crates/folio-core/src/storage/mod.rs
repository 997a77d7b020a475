//! Named-file storage abstraction.

use alloc::vec::Vec;

mod memory;

pub use memory::{MemoryStore, MemoryStoreError};

/// Coarse class of a store failure, as seen by the reader.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreErrorKind {
    /// The medium itself cannot be reached or mounted.
    Unavailable,
    /// The file exists but exceeds what the store will load.
    TooLarge { bytes: usize },
    /// Any other failure on a working medium.
    Other,
}

/// Store errors expose their kind so callers can react without knowing the medium.
pub trait StoreError: core::fmt::Debug {
    fn kind(&self) -> StoreErrorKind;
}

/// Whole-file access to the medium holding books and progress records.
pub trait FileStore {
    type Error: StoreError;

    /// Reads the complete file, or `Ok(None)` when it does not exist.
    fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Replaces the file contents, creating the file when missing.
    fn overwrite(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error>;
}

/// Strips the leading `/` of root-relative paths; the medium only has a root directory.
pub fn file_name(path: &str) -> &str {
    path.trim_start_matches('/')
}
