//! Modal menu overlay and the UI mode that gates button routing.

use crate::render::{MenuRowView, Orientation, SettingValue};

pub const MENU_TITLE: &str = "Menu";
pub const MIN_TEXT_SIZE: u8 = 1;
pub const MAX_TEXT_SIZE: u8 = 3;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum UiMode {
    #[default]
    Reading,
    MenuActive,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MenuOption {
    SelectBook,
    TextSize,
    Orientation,
    Exit,
}

impl MenuOption {
    pub const ALL: [Self; 4] = [Self::SelectBook, Self::TextSize, Self::Orientation, Self::Exit];

    pub const fn label(self) -> &'static str {
        match self {
            Self::SelectBook => "Select Book",
            Self::TextSize => "Text Size",
            Self::Orientation => "Orientation",
            Self::Exit => "Exit Menu",
        }
    }
}

/// Cursor over [`MenuOption::ALL`]; wraps in both directions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MenuState {
    cursor: usize,
}

impl MenuState {
    pub const fn new() -> Self {
        Self { cursor: 0 }
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub const fn selected(&self) -> MenuOption {
        MenuOption::ALL[self.cursor]
    }

    pub fn move_next(&mut self) {
        self.cursor = (self.cursor + 1) % MenuOption::ALL.len();
    }

    pub fn move_prev(&mut self) {
        self.cursor = self
            .cursor
            .checked_sub(1)
            .unwrap_or(MenuOption::ALL.len() - 1);
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn rows<'a>(
        &self,
        book: &'a str,
        text_size: u8,
        orientation: Orientation,
    ) -> [MenuRowView<'a>; 4] {
        MenuOption::ALL.map(|option| MenuRowView {
            key: option.label(),
            value: match option {
                MenuOption::SelectBook => SettingValue::Label(book),
                MenuOption::TextSize => SettingValue::Number(text_size as u16),
                MenuOption::Orientation => SettingValue::Label(orientation.label()),
                MenuOption::Exit => SettingValue::Action,
            },
        })
    }
}

pub fn next_text_size(size: u8) -> u8 {
    if (MIN_TEXT_SIZE..MAX_TEXT_SIZE).contains(&size) {
        size + 1
    } else {
        MIN_TEXT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_both_ways() {
        let mut menu = MenuState::new();

        menu.move_prev();
        assert_eq!(menu.selected(), MenuOption::Exit);

        menu.move_next();
        assert_eq!(menu.selected(), MenuOption::SelectBook);

        for _ in 0..5 {
            menu.move_next();
        }
        assert_eq!(menu.selected(), MenuOption::TextSize);

        menu.reset();
        assert_eq!(menu.cursor(), 0);
    }

    #[test]
    fn text_size_cycles_one_to_three() {
        assert_eq!(next_text_size(1), 2);
        assert_eq!(next_text_size(2), 3);
        assert_eq!(next_text_size(3), 1);
        assert_eq!(next_text_size(0), 1);
        assert_eq!(next_text_size(7), 1);
    }

    #[test]
    fn rows_show_current_values() {
        let rows = MenuState::new().rows("Beyond-Order", 2, Orientation::Portrait);

        assert_eq!(rows[0].value, SettingValue::Label("Beyond-Order"));
        assert_eq!(rows[1].value, SettingValue::Number(2));
        assert_eq!(rows[2].value, SettingValue::Label("Portrait"));
        assert_eq!(rows[3].key, "Exit Menu");
    }
}
