//! Fixtures shared by the unit tests.

use alloc::{format, string::String, vec::Vec};

use crate::book::{BookIndex, PageCountConvention};

pub(crate) const BOOK_ID: &str = "Beyond-Order";

/// JSON index holding `BOOK_ID` with pages whose content is `page {n}`.
pub(crate) fn numbered_json(id: &str, total: usize) -> String {
    let records: Vec<String> = (0..total)
        .map(|page| format!(r#"{{"page_number": {page}, "content": "page {page}"}}"#))
        .collect();
    format!(r#"{{"{id}": [{}]}}"#, records.join(","))
}

pub(crate) fn numbered_book(total: usize) -> BookIndex {
    match BookIndex::parse(
        numbered_json(BOOK_ID, total).as_bytes(),
        BOOK_ID,
        PageCountConvention::RecordCount,
    ) {
        Ok(book) => book,
        Err(err) => panic!("fixture book failed to parse: {err}"),
    }
}
