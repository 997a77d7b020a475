use log::warn;

use super::ReaderApp;
use crate::{
    menu::{MENU_TITLE, UiMode},
    pagination::TurnResult,
    render::{FramePageRenderer, Screen, ScreenSink, compose},
    storage::FileStore,
};

impl<FS, SCR> ReaderApp<FS, SCR>
where
    FS: FileStore,
    SCR: ScreenSink,
{
    /// Draws whatever the current UI mode shows.
    pub fn redraw(&mut self) {
        match self.ui {
            UiMode::Reading => {
                self.redraw_page();
            }
            UiMode::MenuActive => self.draw_menu(),
        }
    }

    pub(super) fn redraw_page(&mut self) -> TurnResult {
        if self.power.is_sleeping() || !self.pages_loaded() {
            return TurnResult::NoOp;
        }

        let layout = self.layout();
        let mut renderer = FramePageRenderer::new(&mut self.screen, layout, self.battery_percent);
        self.pager.redraw(&mut renderer)
    }

    pub(super) fn draw_menu(&mut self) {
        if self.power.is_sleeping() {
            return;
        }

        let book = self.book_spec().map_or("-", |spec| spec.id);
        let rows = self.menu.rows(book, self.text_size, self.orientation);
        let frame = compose(
            &Screen::Menu {
                title: MENU_TITLE,
                rows: &rows,
                cursor: self.menu.cursor(),
            },
            &self.layout(),
        );

        if let Err(err) = self.screen.draw(&frame) {
            warn!("display: menu draw failed err={:?}", err);
        }
    }

    /// Replaces the panel contents with a one- or two-line message.
    pub fn show_status(&mut self, line1: &str, line2: &str) {
        if self.power.is_sleeping() {
            return;
        }

        let frame = compose(&Screen::Status { line1, line2 }, &self.layout());
        if let Err(err) = self.screen.draw(&frame) {
            warn!("display: status draw failed err={:?}", err);
        }
    }
}
