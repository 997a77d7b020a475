use alloc::string::String;

use log::{debug, info, warn};

use super::{ReaderApp, STATUS_NO_BOOK, STATUS_SLEEPING};
use crate::{
    book,
    input::{InputEvent, InputProvider},
    menu::{MenuOption, UiMode, next_text_size},
    pagination::TurnResult,
    power::{PowerAction, SleepController},
    progress::FileProgress,
    render::{FramePageRenderer, ScreenSink},
    storage::FileStore,
};

/// What a button press did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Handled {
    Page(TurnResult),
    MenuOpened,
    MenuMoved,
    MenuUpdated,
    MenuClosed(TurnResult),
    BookSelected(TurnResult),
    /// The selected book failed to load; the current one stays open.
    BookRejected,
}

impl Handled {
    pub const fn drew_frame(self) -> bool {
        match self {
            Self::Page(result) | Self::BookSelected(result) => result.page().is_some(),
            Self::MenuOpened
            | Self::MenuMoved
            | Self::MenuUpdated
            | Self::MenuClosed(_)
            | Self::BookRejected => true,
        }
    }
}

impl<FS, SCR> ReaderApp<FS, SCR>
where
    FS: FileStore,
    SCR: ScreenSink,
{
    /// Drains every pending press from `input`.
    pub fn process_inputs<IN>(&mut self, input: &mut IN, now_ms: u64)
    where
        IN: InputProvider,
    {
        loop {
            match input.poll_event() {
                Ok(Some(event)) => {
                    self.handle_event(event, now_ms);
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("input: poll failed err={:?}", err);
                    break;
                }
            }
        }
    }

    pub fn handle_event(&mut self, event: InputEvent, now_ms: u64) -> Handled {
        let woke = self.power.on_input(now_ms);

        let handled = match self.ui {
            UiMode::Reading => self.apply_reading_input(event),
            UiMode::MenuActive => self.apply_menu_input(event),
        };
        debug!("app: event={:?} handled={:?}", event, handled);

        // The sleep notice is still on the panel.
        if woke && !handled.drew_frame() {
            self.redraw();
        }
        handled
    }

    fn apply_reading_input(&mut self, event: InputEvent) -> Handled {
        let Some(spec) = self.book_spec() else {
            return Handled::Page(TurnResult::NoOp);
        };

        match event {
            InputEvent::Menu => {
                self.ui = UiMode::MenuActive;
                self.menu.reset();
                self.draw_menu();
                Handled::MenuOpened
            }
            InputEvent::Next | InputEvent::Prev => {
                let layout = self.layout();
                let mut renderer =
                    FramePageRenderer::new(&mut self.screen, layout, self.battery_percent);
                let mut progress = FileProgress::new(&mut self.store, spec.progress_file);
                let result = if event == InputEvent::Next {
                    self.pager.next_page(&mut renderer, &mut progress)
                } else {
                    self.pager.prev_page(&mut renderer, &mut progress)
                };
                Handled::Page(result)
            }
        }
    }

    fn apply_menu_input(&mut self, event: InputEvent) -> Handled {
        match event {
            InputEvent::Next => {
                self.menu.move_next();
                self.draw_menu();
                Handled::MenuMoved
            }
            InputEvent::Prev => {
                self.menu.move_prev();
                self.draw_menu();
                Handled::MenuMoved
            }
            InputEvent::Menu => self.activate(self.menu.selected()),
        }
    }

    fn activate(&mut self, option: MenuOption) -> Handled {
        match option {
            MenuOption::SelectBook => self.select_next_book(),
            MenuOption::TextSize => {
                self.text_size = next_text_size(self.text_size);
                info!("app: text_size={}", self.text_size);
                self.draw_menu();
                Handled::MenuUpdated
            }
            MenuOption::Orientation => {
                self.orientation = self.orientation.toggled();
                info!("app: orientation={:?}", self.orientation);
                self.draw_menu();
                Handled::MenuUpdated
            }
            MenuOption::Exit => {
                self.ui = UiMode::Reading;
                let result = self.redraw_page();
                if !self.pages_loaded() {
                    // Nothing to show; replace the menu so it does not linger.
                    let reason = self
                        .last_error
                        .as_ref()
                        .map_or_else(|| String::from(STATUS_NO_BOOK), book::describe);
                    self.show_status(&reason, "");
                }
                Handled::MenuClosed(result)
            }
        }
    }

    fn select_next_book(&mut self) -> Handled {
        let count = self.config.books.len();
        if count == 0 {
            return Handled::BookRejected;
        }

        let slot = (self.book_slot + 1) % count;
        match self.open_book(slot) {
            Ok(result) => {
                self.ui = UiMode::Reading;
                Handled::BookSelected(result)
            }
            Err(_) => {
                self.draw_menu();
                Handled::BookRejected
            }
        }
    }

    /// Advances the idle clock and puts the device to sleep when due.
    pub fn poll_power<C>(&mut self, now_ms: u64, sleeper: &mut C) -> PowerAction
    where
        C: SleepController,
    {
        if self.config.sleep_notice && self.power.sleep_due(now_ms) {
            self.show_status(STATUS_SLEEPING, "press any button");
        }

        let action = self.power.poll(now_ms);
        match action {
            PowerAction::EnterSleep(mode) => sleeper.enter_sleep(mode, &InputEvent::ALL),
            PowerAction::Woke => {
                self.redraw();
            }
            PowerAction::Stay => {}
        }
        action
    }
}
