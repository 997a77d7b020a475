//! Page-index state machine.
//!
//! Owns the current position, the loaded book and its page window. Every
//! accepted move renders the new page and then persists it; requests that
//! would leave `[0, total_pages)` change nothing.

use log::{debug, info, warn};

use crate::{
    book::PageSource,
    buffer::{PageBuffer, WindowBounds},
    progress::ProgressStore,
};

/// Page handed to the display boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageView<'a> {
    pub text: &'a str,
    /// 1-based.
    pub page_number: usize,
}

/// Display boundary used by the controller.
pub trait PageRenderer {
    type Error: core::fmt::Debug;

    fn render_page(&mut self, page: PageView<'_>) -> Result<(), Self::Error>;
}

/// Outcome of a page request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TurnResult {
    /// Same page, out of range, or no book loaded.
    NoOp,
    Rendered { page: usize },
    /// Position moved but the display rejected the frame.
    RenderFailed { page: usize },
}

impl TurnResult {
    pub const fn page(self) -> Option<usize> {
        match self {
            Self::NoOp => None,
            Self::Rendered { page } | Self::RenderFailed { page } => Some(page),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pager<S> {
    source: Option<S>,
    buffer: PageBuffer,
    current: usize,
    persist_failures: u32,
}

impl<S> Default for Pager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Pager<S> {
    pub const fn new() -> Self {
        Self {
            source: None,
            buffer: PageBuffer::new(),
            current: 0,
            persist_failures: 0,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    pub fn window(&self) -> Option<WindowBounds> {
        self.buffer.bounds()
    }

    pub fn refill_count(&self) -> u32 {
        self.buffer.refill_count()
    }

    /// Saves that failed since the pager was created.
    pub fn persist_failures(&self) -> u32 {
        self.persist_failures
    }

    /// Drops the book; every request is a no-op until the next `load`.
    pub fn unload(&mut self) -> Option<S> {
        self.buffer.clear();
        self.current = 0;
        self.source.take()
    }
}

impl<S> Pager<S>
where
    S: PageSource,
{
    /// Replaces the book. Call `initialize` afterwards to show the first page.
    pub fn load(&mut self, source: S) -> Option<S> {
        let previous = self.unload();
        self.source = Some(source);
        previous
    }

    pub fn total_pages(&self) -> usize {
        self.source.as_ref().map_or(0, PageSource::total_pages)
    }

    /// Moves to the restored position (clamped) and draws it without saving.
    pub fn initialize<R>(&mut self, restored: Option<usize>, renderer: &mut R) -> TurnResult
    where
        R: PageRenderer,
    {
        let total = self.total_pages();
        if total == 0 {
            return TurnResult::NoOp;
        }

        self.current = restored.unwrap_or(0).min(total - 1);
        info!(
            "pager: initialize restored={:?} page={} total={}",
            restored, self.current, total
        );
        self.show(renderer)
    }

    pub fn go_to_page<R, P>(&mut self, target: usize, renderer: &mut R, progress: &mut P) -> TurnResult
    where
        R: PageRenderer,
        P: ProgressStore,
    {
        let total = self.total_pages();
        if target == self.current || target >= total {
            debug!(
                "pager: ignored target={} current={} total={}",
                target, self.current, total
            );
            return TurnResult::NoOp;
        }

        self.current = target;
        let result = self.show(renderer);

        if let Err(err) = progress.save(target) {
            self.persist_failures = self.persist_failures.saturating_add(1);
            warn!("progress: save failed page={} err={:?}", target, err);
        }
        result
    }

    pub fn next_page<R, P>(&mut self, renderer: &mut R, progress: &mut P) -> TurnResult
    where
        R: PageRenderer,
        P: ProgressStore,
    {
        match self.current.checked_add(1) {
            Some(target) => self.go_to_page(target, renderer, progress),
            None => TurnResult::NoOp,
        }
    }

    pub fn prev_page<R, P>(&mut self, renderer: &mut R, progress: &mut P) -> TurnResult
    where
        R: PageRenderer,
        P: ProgressStore,
    {
        match self.current.checked_sub(1) {
            Some(target) => self.go_to_page(target, renderer, progress),
            None => TurnResult::NoOp,
        }
    }

    /// Draws the current page again without touching the progress record.
    pub fn redraw<R>(&mut self, renderer: &mut R) -> TurnResult
    where
        R: PageRenderer,
    {
        if self.total_pages() == 0 {
            return TurnResult::NoOp;
        }
        self.show(renderer)
    }

    fn show<R>(&mut self, renderer: &mut R) -> TurnResult
    where
        R: PageRenderer,
    {
        let page = self.current;
        let Some(source) = self.source.as_ref() else {
            return TurnResult::NoOp;
        };

        let text = match self.buffer.get_page(source, page) {
            Ok(text) => text,
            Err(err) => {
                warn!("pager: page={} unavailable err={}", page, err);
                return TurnResult::NoOp;
            }
        };

        match renderer.render_page(PageView {
            text,
            page_number: page + 1,
        }) {
            Ok(()) => TurnResult::Rendered { page },
            Err(err) => {
                warn!("display: render failed page={} err={:?}", page, err);
                TurnResult::RenderFailed { page }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec::Vec};

    use super::*;
    use crate::{
        book::{BookIndex, PageCountConvention},
        buffer::WINDOW_SIZE,
        progress::{FileProgress, ProgressStore},
        storage::MemoryStore,
        testing::numbered_book,
    };

    #[derive(Default)]
    struct RecordingRenderer {
        pages: Vec<(String, usize)>,
        fail: bool,
    }

    impl PageRenderer for RecordingRenderer {
        type Error = ();

        fn render_page(&mut self, page: PageView<'_>) -> Result<(), Self::Error> {
            self.pages.push((String::from(page.text), page.page_number));
            if self.fail { Err(()) } else { Ok(()) }
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        saved: Vec<usize>,
        fail: bool,
    }

    impl ProgressStore for RecordingProgress {
        type Error = ();

        fn load(&mut self) -> Result<Option<usize>, Self::Error> {
            Ok(self.saved.last().copied())
        }

        fn save(&mut self, page: usize) -> Result<(), Self::Error> {
            if self.fail {
                return Err(());
            }
            self.saved.push(page);
            Ok(())
        }
    }

    fn pager(total: usize) -> Pager<BookIndex> {
        let mut pager = Pager::new();
        pager.load(numbered_book(total));
        pager
    }

    #[test]
    fn go_to_valid_page_renders_and_persists_once() {
        for target in 1..23 {
            let mut pager = pager(23);
            let mut renderer = RecordingRenderer::default();
            let mut progress = RecordingProgress::default();

            let result = pager.go_to_page(target, &mut renderer, &mut progress);

            assert_eq!(result, TurnResult::Rendered { page: target });
            assert_eq!(pager.current_page(), target);
            assert_eq!(renderer.pages.len(), 1);
            assert_eq!(renderer.pages[0].1, target + 1);
            assert_eq!(progress.saved, [target]);
        }
    }

    #[test]
    fn out_of_range_targets_are_ignored() {
        let mut pager = pager(23);
        let mut renderer = RecordingRenderer::default();
        let mut progress = RecordingProgress::default();

        for target in [23, 24, 1_000, usize::MAX] {
            assert_eq!(
                pager.go_to_page(target, &mut renderer, &mut progress),
                TurnResult::NoOp
            );
        }

        assert_eq!(pager.current_page(), 0);
        assert!(renderer.pages.is_empty());
        assert!(progress.saved.is_empty());
    }

    #[test]
    fn same_page_is_a_noop() {
        let mut pager = pager(5);
        let mut renderer = RecordingRenderer::default();
        let mut progress = RecordingProgress::default();

        assert_eq!(
            pager.go_to_page(0, &mut renderer, &mut progress),
            TurnResult::NoOp
        );
        assert!(renderer.pages.is_empty());
    }

    #[test]
    fn next_page_stops_at_last_page() {
        let mut pager = pager(23);
        let mut renderer = RecordingRenderer::default();
        let mut progress = RecordingProgress::default();

        for _ in 0..23 {
            pager.next_page(&mut renderer, &mut progress);
        }
        assert_eq!(pager.current_page(), 22);
        assert_eq!(renderer.pages.len(), 22);

        assert_eq!(
            pager.next_page(&mut renderer, &mut progress),
            TurnResult::NoOp
        );
        assert_eq!(pager.current_page(), 22);
        assert_eq!(progress.saved.len(), 22);
    }

    #[test]
    fn prev_page_at_start_is_a_noop() {
        let mut pager = pager(23);
        let mut renderer = RecordingRenderer::default();
        let mut progress = RecordingProgress::default();

        assert_eq!(
            pager.prev_page(&mut renderer, &mut progress),
            TurnResult::NoOp
        );
        assert_eq!(pager.current_page(), 0);
        assert!(renderer.pages.is_empty());
    }

    #[test]
    fn crossing_window_boundary_refills() {
        let mut pager = pager(23);
        let mut renderer = RecordingRenderer::default();
        let mut progress = RecordingProgress::default();
        pager.initialize(None, &mut renderer);
        assert_eq!(
            pager.window(),
            Some(WindowBounds { start: 0, end: 9 })
        );

        pager.go_to_page(9, &mut renderer, &mut progress);
        assert_eq!(pager.refill_count(), 1);

        pager.go_to_page(10, &mut renderer, &mut progress);
        assert_eq!(
            pager.window(),
            Some(WindowBounds { start: 10, end: 19 })
        );
        assert_eq!(renderer.pages.last().unwrap().0, "page 10");

        pager.prev_page(&mut renderer, &mut progress);
        let window = pager.window().unwrap();
        assert!(window.contains(9));
        assert!(window.len() <= WINDOW_SIZE);
        assert_eq!(renderer.pages.last().unwrap().0, "page 9");
    }

    #[test]
    fn initialize_clamps_and_does_not_persist() {
        let mut pager = pager(23);
        let mut renderer = RecordingRenderer::default();

        assert_eq!(
            pager.initialize(Some(400), &mut renderer),
            TurnResult::Rendered { page: 22 }
        );
        assert_eq!(renderer.pages, [(String::from("page 22"), 23)]);

        assert_eq!(
            pager.initialize(None, &mut renderer),
            TurnResult::Rendered { page: 0 }
        );
    }

    #[test]
    fn fresh_store_starts_at_page_zero() {
        let mut store = MemoryStore::new();
        let restored = FileProgress::new(&mut store, "PROGRESS.TXT").load().unwrap();
        let mut pager = pager(23);
        let mut renderer = RecordingRenderer::default();

        pager.initialize(restored, &mut renderer);

        assert_eq!(pager.current_page(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn page_turns_write_progress_file() {
        let mut store = MemoryStore::new();
        let mut pager = pager(23);
        let mut renderer = RecordingRenderer::default();

        pager.go_to_page(12, &mut renderer, &mut FileProgress::new(&mut store, "PROGRESS.TXT"));
        pager.next_page(&mut renderer, &mut FileProgress::new(&mut store, "PROGRESS.TXT"));

        assert_eq!(store.get("PROGRESS.TXT"), Some(&b"13"[..]));
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn render_failure_still_moves_and_persists() {
        let mut pager = pager(23);
        let mut renderer = RecordingRenderer {
            fail: true,
            ..Default::default()
        };
        let mut progress = RecordingProgress::default();

        assert_eq!(
            pager.next_page(&mut renderer, &mut progress),
            TurnResult::RenderFailed { page: 1 }
        );
        assert_eq!(pager.current_page(), 1);
        assert_eq!(progress.saved, [1]);
    }

    #[test]
    fn persist_failure_keeps_position() {
        let mut pager = pager(23);
        let mut renderer = RecordingRenderer::default();
        let mut progress = RecordingProgress {
            fail: true,
            ..Default::default()
        };

        assert_eq!(
            pager.next_page(&mut renderer, &mut progress),
            TurnResult::Rendered { page: 1 }
        );
        assert_eq!(pager.current_page(), 1);
        assert_eq!(pager.persist_failures(), 1);
    }

    #[test]
    fn malformed_book_leaves_pager_inert() {
        let parsed = BookIndex::parse(b"{ nope", "b", PageCountConvention::RecordCount);
        assert!(parsed.is_err());

        let mut pager: Pager<BookIndex> = Pager::new();
        let mut renderer = RecordingRenderer::default();
        let mut progress = RecordingProgress::default();

        assert_eq!(pager.total_pages(), 0);
        for target in [0, 1, 5] {
            assert_eq!(
                pager.go_to_page(target, &mut renderer, &mut progress),
                TurnResult::NoOp
            );
        }
        assert_eq!(pager.initialize(Some(3), &mut renderer), TurnResult::NoOp);
        assert_eq!(pager.redraw(&mut renderer), TurnResult::NoOp);
        assert!(renderer.pages.is_empty());
        assert!(progress.saved.is_empty());
    }

    #[test]
    fn huge_page_number_keeps_turns_in_range() {
        let json = br#"{"b": [{"page_number": 0}, {"page_number": 18446744073709551615}]}"#;
        let book = BookIndex::parse(json, "b", PageCountConvention::MaxPageNumberPlusOne).unwrap();
        let total = book.total_pages();
        let mut pager = Pager::new();
        pager.load(book);
        let mut renderer = RecordingRenderer::default();
        let mut progress = RecordingProgress::default();

        assert_eq!(
            pager.initialize(Some(usize::MAX), &mut renderer),
            TurnResult::Rendered { page: total - 1 }
        );
        assert_eq!(
            pager.prev_page(&mut renderer, &mut progress),
            TurnResult::Rendered { page: total - 2 }
        );
        assert_eq!(
            pager.next_page(&mut renderer, &mut progress),
            TurnResult::Rendered { page: total - 1 }
        );
        assert_eq!(pager.next_page(&mut renderer, &mut progress), TurnResult::NoOp);
        assert_eq!(renderer.pages.last().map(|(_, number)| *number), Some(total));
        assert_eq!(progress.saved, [total - 2, total - 1]);
    }

    #[test]
    fn loading_another_book_resets_position_and_window() {
        let mut pager = pager(23);
        let mut renderer = RecordingRenderer::default();
        let mut progress = RecordingProgress::default();
        pager.go_to_page(15, &mut renderer, &mut progress);

        let previous = pager.load(numbered_book(4));

        assert_eq!(previous.map(|book| book.total_pages()), Some(23));
        assert_eq!(pager.current_page(), 0);
        assert_eq!(pager.window(), None);
        assert_eq!(pager.total_pages(), 4);
    }

    #[test]
    fn redraw_does_not_persist() {
        let mut pager = pager(3);
        let mut renderer = RecordingRenderer::default();

        assert_eq!(pager.redraw(&mut renderer), TurnResult::Rendered { page: 0 });
        assert_eq!(TurnResult::NoOp.page(), None);
        assert_eq!(TurnResult::RenderFailed { page: 2 }.page(), Some(2));
    }
}
