//! Book store adapter.
//!
//! A book index file is a JSON object keyed by book id; each value is an
//! ordered array of `{ "page_number": n, "content": "..." }` records. Only the
//! selected book is materialized, the other books are skipped while parsing.

use alloc::{
    collections::BTreeSet,
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use log::{info, warn};
use serde::{
    Deserialize, Deserializer,
    de::{DeserializeSeed, IgnoredAny, MapAccess, Visitor},
};

use crate::storage::{FileStore, StoreError, StoreErrorKind};

/// How the number of pages is derived from the page records.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PageCountConvention {
    /// One page per record; lookups are positional.
    #[default]
    RecordCount,
    /// Highest `page_number` plus one. Records without a number count at their position.
    MaxPageNumberPlusOne,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BookError {
    #[error("storage unavailable")]
    StorageUnavailable,
    #[error("book file {file} not found")]
    NotFound { file: String },
    #[error("malformed book index: {diagnostic}")]
    ParseError { diagnostic: String },
    #[error("book {book} missing from index")]
    BookKeyMissing { book: String },
    #[error("book file {file} too large ({bytes} bytes)")]
    TooLarge { file: String, bytes: usize },
    #[error("book file {file} unreadable")]
    ReadFailed { file: String },
}

/// Positional access to decoded page text.
pub trait PageSource {
    fn total_pages(&self) -> usize;

    /// Text of `index`, empty when the page has no content.
    fn page_content(&self, index: usize) -> &str;
}

#[derive(Debug, Clone, Deserialize)]
struct PageRecord {
    #[serde(default)]
    page_number: Option<u64>,
    #[serde(default)]
    content: Option<String>,
}

/// One loaded book, immutable until another book is selected.
#[derive(Debug, Clone)]
pub struct BookIndex {
    id: String,
    pages: Vec<PageRecord>,
    total_pages: usize,
}

impl BookIndex {
    /// Parses `bytes` and keeps the records of `book_id`.
    pub fn parse(
        bytes: &[u8],
        book_id: &str,
        convention: PageCountConvention,
    ) -> Result<Self, BookError> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        let selected = SelectBook { id: book_id }
            .deserialize(&mut de)
            .and_then(|pages| de.end().map(|()| pages))
            .map_err(|err| BookError::ParseError {
                diagnostic: err.to_string(),
            })?;

        let Some(pages) = selected else {
            return Err(BookError::BookKeyMissing {
                book: String::from(book_id),
            });
        };

        let duplicates = duplicate_page_numbers(&pages);
        if duplicates > 0 {
            warn!("book: id={} duplicate_page_numbers={}", book_id, duplicates);
        }

        let total_pages = count_pages(&pages, convention);
        Ok(Self {
            id: String::from(book_id),
            pages,
            total_pages,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record_count(&self) -> usize {
        self.pages.len()
    }
}

impl PageSource for BookIndex {
    fn total_pages(&self) -> usize {
        self.total_pages
    }

    fn page_content(&self, index: usize) -> &str {
        self.pages
            .get(index)
            .and_then(|record| record.content.as_deref())
            .unwrap_or("")
    }
}

/// Reads `file` from `store` and loads `book_id` out of it.
pub fn load_book<FS>(
    store: &mut FS,
    file: &str,
    book_id: &str,
    convention: PageCountConvention,
) -> Result<BookIndex, BookError>
where
    FS: FileStore,
{
    let bytes = match store.read(file) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            return Err(BookError::NotFound {
                file: String::from(file),
            });
        }
        Err(err) => {
            warn!("book: read failed file={} err={:?}", file, err);
            let file = String::from(file);
            return Err(match err.kind() {
                StoreErrorKind::Unavailable => BookError::StorageUnavailable,
                StoreErrorKind::TooLarge { bytes } => BookError::TooLarge { file, bytes },
                StoreErrorKind::Other => BookError::ReadFailed { file },
            });
        }
    };

    let book = BookIndex::parse(&bytes, book_id, convention)?;
    info!(
        "book: loaded id={} records={} total_pages={} bytes={}",
        book.id,
        book.record_count(),
        book.total_pages,
        bytes.len()
    );
    Ok(book)
}

fn count_pages(pages: &[PageRecord], convention: PageCountConvention) -> usize {
    match convention {
        PageCountConvention::RecordCount => pages.len(),
        PageCountConvention::MaxPageNumberPlusOne => pages
            .iter()
            .enumerate()
            .map(|(position, record)| {
                record
                    .page_number
                    .map_or(position, |number| usize::try_from(number).unwrap_or(usize::MAX))
            })
            .max()
            .map_or(0, |max| max.saturating_add(1)),
    }
}

fn duplicate_page_numbers(pages: &[PageRecord]) -> usize {
    let mut seen = BTreeSet::new();
    pages
        .iter()
        .filter_map(|record| record.page_number)
        .filter(|number| !seen.insert(*number))
        .count()
}

/// Deserializes the top-level object, keeping only the array under `id`.
struct SelectBook<'a> {
    id: &'a str,
}

impl<'de> DeserializeSeed<'de> for SelectBook<'_> {
    type Value = Option<Vec<PageRecord>>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for SelectBook<'_> {
    type Value = Option<Vec<PageRecord>>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object keyed by book id")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut selected = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == self.id && selected.is_none() {
                selected = Some(map.next_value::<Vec<PageRecord>>()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(selected)
    }
}

/// Short form used in status lines.
pub fn describe(err: &BookError) -> String {
    match err {
        BookError::StorageUnavailable => String::from("NO SD CARD"),
        BookError::NotFound { .. } => String::from("BOOK NOT FOUND"),
        BookError::ParseError { .. } => String::from("BAD BOOK FILE"),
        BookError::BookKeyMissing { book } => format!("NO BOOK {book}"),
        BookError::TooLarge { .. } => String::from("BOOK TOO LARGE"),
        BookError::ReadFailed { .. } => String::from("READ ERROR"),
    }
}
