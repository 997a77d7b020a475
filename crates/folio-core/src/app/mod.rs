//! Reader session: owns the loaded book, the page state, the UI mode and
//! the power state, and routes button presses between them.

use log::{error, info, warn};

use crate::{
    book::{self, BookError, BookIndex, PageSource},
    config::{BookSpec, PanelProfile, ReaderConfig},
    menu::{MIN_TEXT_SIZE, MenuState, UiMode},
    pagination::{Pager, TurnResult},
    power::{PowerMachine, PowerState},
    progress::{FileProgress, ProgressStore},
    render::{FramePageRenderer, Layout, Orientation, ScreenSink},
    storage::FileStore,
};

mod input;
mod view;


pub use input::Handled;

pub const STATUS_NO_STORAGE: &str = "NO SD CARD";
pub const STATUS_TOO_LARGE: &str = "BOOK TOO LARGE";
pub const STATUS_NO_BOOK: &str = "NO BOOK";
pub const STATUS_SLEEPING: &str = "SLEEPING";

pub struct ReaderApp<FS, SCR> {
    store: FS,
    screen: SCR,
    config: ReaderConfig,
    panel: PanelProfile,
    pager: Pager<BookIndex>,
    power: PowerMachine,
    ui: UiMode,
    menu: MenuState,
    book_slot: usize,
    text_size: u8,
    orientation: Orientation,
    battery_percent: u8,
    battery_sampled_ms: Option<u64>,
    last_error: Option<BookError>,
}

impl<FS, SCR> ReaderApp<FS, SCR>
where
    FS: FileStore,
    SCR: ScreenSink,
{
    pub fn new(store: FS, screen: SCR, config: ReaderConfig, panel: PanelProfile, now_ms: u64) -> Self {
        Self {
            store,
            screen,
            power: PowerMachine::new(now_ms, config.idle_timeout_ms, config.sleep_mode),
            config,
            panel,
            pager: Pager::new(),
            ui: UiMode::Reading,
            menu: MenuState::new(),
            book_slot: 0,
            text_size: MIN_TEXT_SIZE,
            orientation: panel.orientation,
            battery_percent: 100,
            battery_sampled_ms: None,
            last_error: None,
        }
    }

    /// Loads the first configured book, restores its position and draws it.
    pub fn boot(&mut self) -> Result<TurnResult, BookError> {
        info!(
            "app: boot books={} idle_timeout_ms={}",
            self.config.books.len(),
            self.config.idle_timeout_ms
        );

        match self.open_book(0) {
            Ok(result) => Ok(result),
            Err(BookError::StorageUnavailable) => {
                error!("sd: storage unavailable, reader halted for this session");
                self.show_status(STATUS_NO_STORAGE, "insert card and restart");
                Err(BookError::StorageUnavailable)
            }
            Err(err @ BookError::TooLarge { .. }) => {
                self.show_status(STATUS_TOO_LARGE, "split the book file");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Replaces the loaded book with `slot` and draws its restored page.
    ///
    /// On failure the previously loaded book, if any, stays in place.
    fn open_book(&mut self, slot: usize) -> Result<TurnResult, BookError> {
        let Some(spec) = self.config.books.get(slot).copied() else {
            let err = BookError::BookKeyMissing {
                book: alloc::format!("#{slot}"),
            };
            self.last_error = Some(err.clone());
            return Err(err);
        };

        let book = match book::load_book(&mut self.store, spec.file, spec.id, self.config.page_count)
        {
            Ok(book) => book,
            Err(err) => {
                warn!("book: load failed id={} err={}", spec.id, err);
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        let restored = match FileProgress::new(&mut self.store, spec.progress_file).load() {
            Ok(restored) => restored,
            Err(err) => {
                warn!("progress: load failed path={} err={:?}", spec.progress_file, err);
                None
            }
        };

        self.pager.load(book);
        self.book_slot = slot;
        self.last_error = None;

        let layout = self.layout();
        let mut renderer = FramePageRenderer::new(&mut self.screen, layout, self.battery_percent);
        Ok(self.pager.initialize(restored, &mut renderer))
    }

    fn layout(&self) -> Layout {
        self.config.layout(&self.panel, self.orientation, self.text_size)
    }

    fn book_spec(&self) -> Option<BookSpec> {
        self.config.books.get(self.book_slot).copied()
    }

    /// Records a battery sample. Shown on the next page draw.
    pub fn set_battery_percent(&mut self, percent: u8, now_ms: u64) {
        self.battery_percent = percent.min(100);
        self.battery_sampled_ms = Some(now_ms);
    }

    pub fn battery_sample_due(&self, now_ms: u64) -> bool {
        self.battery_sampled_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.config.battery_refresh_ms)
    }

    pub fn ui_mode(&self) -> UiMode {
        self.ui
    }

    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages()
    }

    pub fn book_id(&self) -> Option<&str> {
        self.pager.source().map(BookIndex::id)
    }

    pub fn text_size(&self) -> u8 {
        self.text_size
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn battery_percent(&self) -> u8 {
        self.battery_percent
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    pub fn last_error(&self) -> Option<&BookError> {
        self.last_error.as_ref()
    }

    pub fn persist_failures(&self) -> u32 {
        self.pager.persist_failures()
    }

    pub fn store(&self) -> &FS {
        &self.store
    }

    pub fn screen(&self) -> &SCR {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut SCR {
        &mut self.screen
    }

    fn pages_loaded(&self) -> bool {
        self.pager.source().is_some_and(|book| book.total_pages() > 0)
    }
}
