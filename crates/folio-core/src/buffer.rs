//! Bounded window of decoded page text.
//!
//! At most [`WINDOW_SIZE`] pages are held at once. A miss always replaces the
//! whole window: forward misses start the window at the requested page,
//! backward misses end it there so stepping back does not refill every page.

use alloc::{string::String, vec::Vec};

use log::debug;

use crate::book::PageSource;

pub const WINDOW_SIZE: usize = 10;

/// Inclusive page range held by the buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowBounds {
    pub start: usize,
    pub end: usize,
}

impl WindowBounds {
    pub const fn contains(&self, page: usize) -> bool {
        self.start <= page && page <= self.end
    }

    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BufferError {
    #[error("no book loaded")]
    NoBook,
    #[error("page {page} out of range for {total_pages} pages")]
    OutOfRange { page: usize, total_pages: usize },
    #[error("page {page} outside window {start}..={end}")]
    OutOfWindow {
        page: usize,
        start: usize,
        end: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct PageBuffer {
    start: usize,
    pages: Vec<String>,
    refills: u32,
}

impl PageBuffer {
    pub const fn new() -> Self {
        Self {
            start: 0,
            pages: Vec::new(),
            refills: 0,
        }
    }

    pub fn bounds(&self) -> Option<WindowBounds> {
        if self.pages.is_empty() {
            return None;
        }
        Some(WindowBounds {
            start: self.start,
            end: self.start + (self.pages.len() - 1),
        })
    }

    pub fn contains(&self, page: usize) -> bool {
        self.bounds().is_some_and(|bounds| bounds.contains(page))
    }

    /// Drops the window; used when the book is unloaded or replaced.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.start = 0;
    }

    /// Number of window loads since creation.
    pub fn refill_count(&self) -> u32 {
        self.refills
    }

    /// Makes sure `page` is buffered. Returns `true` when a refill happened.
    pub fn ensure_window<S>(&mut self, source: &S, page: usize) -> Result<bool, BufferError>
    where
        S: PageSource + ?Sized,
    {
        let total_pages = source.total_pages();
        if total_pages == 0 {
            return Err(BufferError::NoBook);
        }
        if page >= total_pages {
            return Err(BufferError::OutOfRange { page, total_pages });
        }

        let current = self.bounds().filter(|bounds| bounds.end < total_pages);
        if current.is_some_and(|bounds| bounds.contains(page)) {
            return Ok(false);
        }

        let start = match current {
            Some(bounds) if page < bounds.start => (page + 1).saturating_sub(WINDOW_SIZE),
            _ => page,
        };
        let end = start.saturating_add(WINDOW_SIZE - 1).min(total_pages - 1);

        self.pages.clear();
        self.pages
            .extend((start..=end).map(|index| String::from(source.page_content(index))));
        self.start = start;
        self.refills = self.refills.wrapping_add(1);

        debug!("buffer: refill page={} window={}..={}", page, start, end);
        Ok(true)
    }

    /// Buffered text of `page`; the window must already cover it.
    pub fn page(&self, page: usize) -> Result<&str, BufferError> {
        match self.bounds() {
            Some(bounds) if bounds.contains(page) => Ok(&self.pages[page - bounds.start]),
            Some(bounds) => Err(BufferError::OutOfWindow {
                page,
                start: bounds.start,
                end: bounds.end,
            }),
            None => Err(BufferError::NoBook),
        }
    }

    /// Text of `page`, refilling the window first when needed.
    pub fn get_page<S>(&mut self, source: &S, page: usize) -> Result<&str, BufferError>
    where
        S: PageSource + ?Sized,
    {
        self.ensure_window(source, page)?;
        self.page(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::numbered_book;

    fn bounds(start: usize, end: usize) -> Option<WindowBounds> {
        Some(WindowBounds { start, end })
    }

    #[test]
    fn twenty_three_page_scenario() {
        let book = numbered_book(23);
        let mut buffer = PageBuffer::new();

        assert!(buffer.ensure_window(&book, 0).unwrap());
        assert_eq!(buffer.bounds(), bounds(0, 9));

        assert!(!buffer.ensure_window(&book, 9).unwrap());
        assert_eq!(buffer.bounds(), bounds(0, 9));

        assert!(buffer.ensure_window(&book, 10).unwrap());
        assert_eq!(buffer.bounds(), bounds(10, 19));

        assert!(buffer.ensure_window(&book, 20).unwrap());
        assert_eq!(buffer.bounds(), bounds(20, 22));
    }

    #[test]
    fn window_invariant_holds_for_every_page() {
        let book = numbered_book(23);
        let mut buffer = PageBuffer::new();

        for page in (0..23).chain((0..23).rev()).chain([7, 21, 3, 15, 0, 22]) {
            buffer.ensure_window(&book, page).unwrap();
            let window = buffer.bounds().unwrap();
            assert!(window.start <= page && page <= window.end, "page {page}");
            assert!(window.end - window.start < WINDOW_SIZE);
            assert!(window.end < 23);
            assert_eq!(buffer.page(page).unwrap(), book_text(page));
        }
    }

    #[test]
    fn backward_miss_keeps_target_at_window_end() {
        let book = numbered_book(23);
        let mut buffer = PageBuffer::new();
        buffer.ensure_window(&book, 10).unwrap();

        assert!(buffer.ensure_window(&book, 9).unwrap());
        assert_eq!(buffer.bounds(), bounds(0, 9));

        for page in (0..9).rev() {
            assert!(!buffer.ensure_window(&book, page).unwrap());
        }
        assert_eq!(buffer.refill_count(), 2);
    }

    #[test]
    fn backward_miss_near_start_clamps_to_zero() {
        let book = numbered_book(23);
        let mut buffer = PageBuffer::new();
        buffer.ensure_window(&book, 5).unwrap();

        buffer.ensure_window(&book, 3).unwrap();

        assert_eq!(buffer.bounds(), bounds(0, 9));
    }

    #[test]
    fn single_step_forward_reads_refill_once_per_window() {
        let book = numbered_book(23);
        let mut buffer = PageBuffer::new();

        for page in 0..23 {
            buffer.get_page(&book, page).unwrap();
        }

        assert_eq!(buffer.refill_count(), 3);
    }

    #[test]
    fn short_book_window_is_truncated() {
        let book = numbered_book(4);
        let mut buffer = PageBuffer::new();

        buffer.ensure_window(&book, 0).unwrap();

        assert_eq!(buffer.bounds(), bounds(0, 3));
        assert_eq!(buffer.bounds().unwrap().len(), 4);
    }

    #[test]
    fn strict_read_outside_window_fails() {
        let book = numbered_book(23);
        let mut buffer = PageBuffer::new();
        buffer.ensure_window(&book, 0).unwrap();

        assert_eq!(
            buffer.page(12),
            Err(BufferError::OutOfWindow {
                page: 12,
                start: 0,
                end: 9
            })
        );
    }

    #[test]
    fn lazy_read_refills() {
        let book = numbered_book(23);
        let mut buffer = PageBuffer::new();
        buffer.ensure_window(&book, 0).unwrap();

        assert_eq!(buffer.get_page(&book, 12).unwrap(), "page 12");
        assert_eq!(buffer.bounds(), bounds(12, 21));
    }

    #[test]
    fn empty_book_and_out_of_range() {
        let mut buffer = PageBuffer::new();

        assert_eq!(
            buffer.ensure_window(&numbered_book(0), 0),
            Err(BufferError::NoBook)
        );
        assert_eq!(
            buffer.ensure_window(&numbered_book(5), 5),
            Err(BufferError::OutOfRange {
                page: 5,
                total_pages: 5
            })
        );
        assert_eq!(buffer.bounds(), None);
        assert_eq!(buffer.page(0), Err(BufferError::NoBook));
    }

    #[test]
    fn stale_window_from_longer_book_is_replaced() {
        let mut buffer = PageBuffer::new();
        buffer.ensure_window(&numbered_book(23), 20).unwrap();

        buffer.ensure_window(&numbered_book(21), 20).unwrap();

        assert_eq!(buffer.bounds(), bounds(20, 20));
    }

    #[test]
    fn clear_empties_window() {
        let book = numbered_book(3);
        let mut buffer = PageBuffer::new();
        buffer.ensure_window(&book, 1).unwrap();

        buffer.clear();

        assert!(!buffer.contains(1));
        assert_eq!(buffer.bounds(), None);
    }

    struct Blank {
        total_pages: usize,
    }

    impl PageSource for Blank {
        fn total_pages(&self) -> usize {
            self.total_pages
        }

        fn page_content(&self, _index: usize) -> &str {
            ""
        }
    }

    #[test]
    fn window_at_top_of_index_range_does_not_overflow() {
        let book = Blank {
            total_pages: usize::MAX,
        };
        let last = usize::MAX - 1;
        let mut buffer = PageBuffer::new();

        assert!(buffer.ensure_window(&book, last).unwrap());
        assert_eq!(buffer.bounds(), bounds(last, last));

        buffer.ensure_window(&book, last - 4).unwrap();
        assert_eq!(buffer.bounds(), bounds(last - 13, last - 4));

        buffer.ensure_window(&book, last - 2).unwrap();
        assert_eq!(buffer.bounds(), bounds(last - 2, last));
        assert_eq!(buffer.get_page(&book, last).unwrap(), "");
    }

    fn book_text(page: usize) -> alloc::string::String {
        alloc::format!("page {page}")
    }
}
