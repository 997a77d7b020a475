//! Screen view models and their draw-command composition.
//!
//! The board renderer only has to execute a flat list of [`DrawCommand`]s;
//! layout decisions (wrapping, footer placement, clipping) happen here so
//! they can be tested without a panel.

use alloc::vec::Vec;
use core::fmt::Write;

use heapless::String;

use crate::pagination::{PageRenderer, PageView};

pub const LABEL_CAPACITY: usize = 32;
pub const GLYPH_WIDTH: u16 = 6;
pub const GLYPH_HEIGHT: u16 = 8;
pub const FOOTER_HEIGHT: u16 = 12;

const GAUGE_WIDTH: u16 = 24;
const GAUGE_HEIGHT: u16 = 10;
const GAUGE_TIP_WIDTH: u16 = 2;
const GAUGE_INSET: u16 = 2;
const MENU_ROW_HEIGHT: u16 = 14;

pub type Label = String<LABEL_CAPACITY>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

impl Orientation {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Portrait => Self::Landscape,
            Self::Landscape => Self::Portrait,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextRef<'a> {
    Borrowed(&'a str),
    Owned(Label),
}

impl TextRef<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Borrowed(text) => text,
            Self::Owned(label) => label.as_str(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RectStyle {
    Outline,
    Filled,
}

/// One drawing step. Positions are the top-left corner in rotated screen space.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DrawCommand<'a> {
    Clear,
    Text {
        origin: Point,
        size: u8,
        inverted: bool,
        text: TextRef<'a>,
    },
    Rect {
        origin: Point,
        width: u16,
        height: u16,
        style: RectStyle,
    },
    Refresh,
}

/// Complete frame: starts with `Clear`, ends with `Refresh`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame<'a> {
    pub orientation: Orientation,
    pub commands: Vec<DrawCommand<'a>>,
}

impl Frame<'_> {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SettingValue<'a> {
    Label(&'a str),
    Number(u16),
    Action,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MenuRowView<'a> {
    pub key: &'a str,
    pub value: SettingValue<'a>,
}

/// App-level view model consumed by the board renderer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Screen<'a> {
    Page {
        text: &'a str,
        /// 1-based.
        page_number: usize,
        battery_percent: u8,
    },
    Menu {
        title: &'a str,
        rows: &'a [MenuRowView<'a>],
        cursor: usize,
    },
    Status {
        line1: &'a str,
        line2: &'a str,
    },
}

/// Executes composed frames on a physical panel.
pub trait ScreenSink {
    type Error: core::fmt::Debug;

    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error>;
}

/// Page renderer that composes a [`Screen::Page`] and hands it to a sink.
#[derive(Debug)]
pub struct FramePageRenderer<'a, S> {
    sink: &'a mut S,
    layout: Layout,
    battery_percent: u8,
}

impl<'a, S> FramePageRenderer<'a, S>
where
    S: ScreenSink,
{
    pub fn new(sink: &'a mut S, layout: Layout, battery_percent: u8) -> Self {
        Self {
            sink,
            layout,
            battery_percent,
        }
    }
}

impl<S> PageRenderer for FramePageRenderer<'_, S>
where
    S: ScreenSink,
{
    type Error = S::Error;

    fn render_page(&mut self, page: PageView<'_>) -> Result<(), Self::Error> {
        let frame = compose(
            &Screen::Page {
                text: page.text,
                page_number: page.page_number,
                battery_percent: self.battery_percent,
            },
            &self.layout,
        );
        self.sink.draw(&frame)
    }
}

/// Geometry of the rotated panel and the text metrics derived from it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    width: u16,
    height: u16,
    orientation: Orientation,
    margin: u16,
    line_height: u16,
    max_chars_per_line: u16,
    text_size: u8,
}

impl Layout {
    /// `native_width`/`native_height` are the panel's portrait dimensions.
    pub fn new(native_width: u16, native_height: u16, orientation: Orientation) -> Self {
        let short = native_width.min(native_height);
        let long = native_width.max(native_height);
        let (width, height) = match orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        };
        Self {
            width,
            height,
            orientation,
            margin: 10,
            line_height: 16,
            max_chars_per_line: 30,
            text_size: 1,
        }
    }

    pub const fn with_margin(mut self, margin: u16) -> Self {
        self.margin = margin;
        self
    }

    pub const fn with_line_height(mut self, line_height: u16) -> Self {
        self.line_height = line_height;
        self
    }

    pub const fn with_max_chars_per_line(mut self, max_chars_per_line: u16) -> Self {
        self.max_chars_per_line = max_chars_per_line;
        self
    }

    pub fn with_text_size(mut self, text_size: u8) -> Self {
        self.text_size = text_size.clamp(1, 3);
        self
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub const fn text_size(&self) -> u8 {
        self.text_size
    }

    pub fn chars_per_line(&self) -> usize {
        let usable = self.width.saturating_sub(2 * self.margin);
        let fit = usable / (GLYPH_WIDTH * self.text_size as u16);
        fit.min(self.max_chars_per_line).max(1) as usize
    }

    pub fn body_line_height(&self) -> u16 {
        self.line_height * self.text_size as u16
    }

    pub fn footer_top(&self) -> u16 {
        self.height.saturating_sub(self.margin + FOOTER_HEIGHT)
    }

    pub fn lines_per_page(&self) -> usize {
        let glyph = GLYPH_HEIGHT * self.text_size as u16;
        let body = self.footer_top().saturating_sub(self.margin);
        if body < glyph {
            return 0;
        }
        ((body - glyph) / self.body_line_height().max(1) + 1) as usize
    }
}

/// Builds the full command list for `screen`.
pub fn compose<'a>(screen: &Screen<'a>, layout: &Layout) -> Frame<'a> {
    let mut commands = Vec::new();
    commands.push(DrawCommand::Clear);

    match *screen {
        Screen::Page {
            text,
            page_number,
            battery_percent,
        } => compose_page(&mut commands, layout, text, page_number, battery_percent),
        Screen::Menu {
            title,
            rows,
            cursor,
        } => compose_menu(&mut commands, layout, title, rows, cursor),
        Screen::Status { line1, line2 } => compose_status(&mut commands, layout, line1, line2),
    }

    commands.push(DrawCommand::Refresh);
    Frame {
        orientation: layout.orientation,
        commands,
    }
}

fn compose_page<'a>(
    out: &mut Vec<DrawCommand<'a>>,
    layout: &Layout,
    text: &'a str,
    page_number: usize,
    battery_percent: u8,
) {
    let margin = layout.margin as i32;
    let step = layout.body_line_height() as i32;

    for (row, line) in wrap_lines(text, layout.chars_per_line())
        .take(layout.lines_per_page())
        .enumerate()
    {
        if line.is_empty() {
            continue;
        }
        out.push(DrawCommand::Text {
            origin: Point::new(margin, margin + row as i32 * step),
            size: layout.text_size,
            inverted: false,
            text: TextRef::Borrowed(line),
        });
    }

    let footer_y = layout.footer_top() as i32 + 2;
    let mut page_label = Label::new();
    let _ = write!(page_label, "Page: {page_number}");
    out.push(DrawCommand::Text {
        origin: Point::new(margin, footer_y),
        size: 1,
        inverted: false,
        text: TextRef::Owned(page_label),
    });

    compose_battery(out, layout, battery_percent.min(100), footer_y);
}

fn compose_battery(out: &mut Vec<DrawCommand<'_>>, layout: &Layout, percent: u8, footer_y: i32) {
    let gauge_x = layout.width as i32 - layout.margin as i32 - (GAUGE_WIDTH + GAUGE_TIP_WIDTH) as i32;
    let gauge_y = footer_y - 1;

    let mut label = Label::new();
    let _ = write!(label, "{percent}%");
    let label_width = label.len() as i32 * GLYPH_WIDTH as i32;
    out.push(DrawCommand::Text {
        origin: Point::new(gauge_x - 4 - label_width, footer_y),
        size: 1,
        inverted: false,
        text: TextRef::Owned(label),
    });

    out.push(DrawCommand::Rect {
        origin: Point::new(gauge_x, gauge_y),
        width: GAUGE_WIDTH,
        height: GAUGE_HEIGHT,
        style: RectStyle::Outline,
    });
    out.push(DrawCommand::Rect {
        origin: Point::new(gauge_x + GAUGE_WIDTH as i32, gauge_y + GAUGE_HEIGHT as i32 / 4),
        width: GAUGE_TIP_WIDTH,
        height: GAUGE_HEIGHT / 2,
        style: RectStyle::Filled,
    });

    let inner = GAUGE_WIDTH - 2 * GAUGE_INSET;
    let fill = (inner as u32 * percent as u32 / 100) as u16;
    if fill > 0 {
        out.push(DrawCommand::Rect {
            origin: Point::new(gauge_x + GAUGE_INSET as i32, gauge_y + GAUGE_INSET as i32),
            width: fill,
            height: GAUGE_HEIGHT - 2 * GAUGE_INSET,
            style: RectStyle::Filled,
        });
    }
}

fn compose_menu<'a>(
    out: &mut Vec<DrawCommand<'a>>,
    layout: &Layout,
    title: &'a str,
    rows: &'a [MenuRowView<'a>],
    cursor: usize,
) {
    let margin = layout.margin as i32;
    out.push(DrawCommand::Text {
        origin: Point::new(margin, margin),
        size: 2,
        inverted: false,
        text: TextRef::Borrowed(title),
    });

    let first_row = margin + (2 * GLYPH_HEIGHT) as i32 + 6;
    let row_width = layout.width.saturating_sub(2 * layout.margin);
    for (index, row) in rows.iter().enumerate() {
        let y = first_row + index as i32 * MENU_ROW_HEIGHT as i32;
        let selected = index == cursor;
        if selected {
            out.push(DrawCommand::Rect {
                origin: Point::new(margin, y),
                width: row_width,
                height: MENU_ROW_HEIGHT,
                style: RectStyle::Filled,
            });
        }
        out.push(DrawCommand::Text {
            origin: Point::new(margin + 4, y + 3),
            size: 1,
            inverted: selected,
            text: TextRef::Owned(menu_row_label(row)),
        });
    }
}

fn compose_status<'a>(out: &mut Vec<DrawCommand<'a>>, layout: &Layout, line1: &'a str, line2: &'a str) {
    let center_y = layout.height as i32 / 2;
    for (text, size, y) in [
        (line1, 2u8, center_y - (2 * GLYPH_HEIGHT) as i32 - 2),
        (line2, 1u8, center_y + 4),
    ] {
        if text.is_empty() {
            continue;
        }
        let width = text.chars().count() as i32 * (GLYPH_WIDTH as i32 * size as i32);
        out.push(DrawCommand::Text {
            origin: Point::new(((layout.width as i32 - width) / 2).max(0), y),
            size,
            inverted: false,
            text: TextRef::Borrowed(text),
        });
    }
}

fn menu_row_label(row: &MenuRowView<'_>) -> Label {
    let mut label = Label::new();
    let _ = match row.value {
        SettingValue::Label(value) => write!(label, "{}: {}", row.key, value),
        SettingValue::Number(value) => write!(label, "{}: {}", row.key, value),
        SettingValue::Action => write!(label, "{}", row.key),
    };
    label
}

/// Splits `text` into lines of at most `width` characters. Newlines force a break.
pub fn wrap_lines(text: &str, width: usize) -> WrapLines<'_> {
    WrapLines {
        rest: text,
        width: width.max(1),
        done: false,
    }
}

#[derive(Clone, Debug)]
pub struct WrapLines<'a> {
    rest: &'a str,
    width: usize,
    done: bool,
}

impl<'a> Iterator for WrapLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut end = self.rest.len();
        let mut skip = 0;
        for (count, (offset, ch)) in self.rest.char_indices().enumerate() {
            if ch == '\n' {
                end = offset;
                skip = 1;
                break;
            }
            if count == self.width {
                end = offset;
                break;
            }
        }

        let line = self.rest[..end].trim_end_matches('\r');
        self.rest = &self.rest[end + skip..];
        if self.rest.is_empty() && skip == 0 {
            self.done = true;
        }
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{string::ToString, vec};

    const NATIVE_WIDTH: u16 = 128;
    const NATIVE_HEIGHT: u16 = 296;

    fn landscape() -> Layout {
        Layout::new(NATIVE_WIDTH, NATIVE_HEIGHT, Orientation::Landscape)
    }

    fn collect(text: &str, width: usize) -> Vec<&str> {
        wrap_lines(text, width).collect()
    }

    #[test]
    fn wraps_at_fixed_character_count() {
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";

        assert_eq!(
            collect(text, 30),
            vec!["abcdefghijklmnopqrstuvwxyz0123", "456789"]
        );
    }

    #[test]
    fn newlines_force_breaks() {
        assert_eq!(collect("one\r\ntwo\n\nthree", 30), vec!["one", "two", "", "three"]);
        assert_eq!(collect("trailing\n", 30), vec!["trailing", ""]);
    }

    #[test]
    fn wrapping_counts_characters_not_bytes() {
        assert_eq!(collect("ñandú ñu", 4), vec!["ñand", "ú ñu"]);
    }

    #[test]
    fn exact_width_text_is_one_line() {
        assert_eq!(collect("abcd", 4), vec!["abcd"]);
        assert_eq!(collect("", 4), vec![""]);
    }

    #[test]
    fn landscape_metrics() {
        let layout = landscape();

        assert_eq!((layout.width(), layout.height()), (296, 128));
        assert_eq!(layout.chars_per_line(), 30);
        assert_eq!(layout.lines_per_page(), 6);
    }

    #[test]
    fn portrait_and_text_size_shrink_line_width() {
        let portrait = Layout::new(NATIVE_WIDTH, NATIVE_HEIGHT, Orientation::Portrait);
        assert_eq!((portrait.width(), portrait.height()), (128, 296));
        assert_eq!(portrait.chars_per_line(), 18);

        let large = landscape().with_text_size(3);
        assert_eq!(large.chars_per_line(), 15);
        assert_eq!(large.lines_per_page(), 2);
        assert_eq!(landscape().with_text_size(9).text_size(), 3);
    }

    #[test]
    fn page_frame_has_body_footer_and_battery() {
        let screen = Screen::Page {
            text: "It was a bright cold day in April, and the clocks were striking thirteen.",
            page_number: 4,
            battery_percent: 87,
        };

        let frame = compose(&screen, &landscape());
        let texts: Vec<_> = frame.texts().collect();

        assert_eq!(frame.commands.first(), Some(&DrawCommand::Clear));
        assert_eq!(frame.commands.last(), Some(&DrawCommand::Refresh));
        assert_eq!(frame.orientation, Orientation::Landscape);
        assert_eq!(
            texts,
            vec![
                "It was a bright cold day in Ap",
                "ril, and the clocks were strik",
                "ing thirteen.",
                "Page: 4",
                "87%",
            ]
        );
    }

    #[test]
    fn body_lines_are_clipped_above_footer() {
        let text = "x".repeat(30 * 20);
        let screen = Screen::Page {
            text: &text,
            page_number: 1,
            battery_percent: 50,
        };

        let frame = compose(&screen, &landscape());

        assert_eq!(frame.texts().filter(|line| line.starts_with('x')).count(), 6);
    }

    #[test]
    fn empty_page_keeps_only_footer() {
        let screen = Screen::Page {
            text: "",
            page_number: 12,
            battery_percent: 3,
        };

        let frame = compose(&screen, &landscape());

        assert_eq!(frame.texts().collect::<Vec<_>>(), vec!["Page: 12", "3%"]);
    }

    #[test]
    fn battery_fill_tracks_percentage() {
        let fills = |percent: u8| -> Vec<u16> {
            let screen = Screen::Page {
                text: "",
                page_number: 1,
                battery_percent: percent,
            };
            compose(&screen, &landscape())
                .commands
                .iter()
                .filter_map(|command| match command {
                    DrawCommand::Rect {
                        width,
                        style: RectStyle::Filled,
                        height,
                        ..
                    } if *height == GAUGE_HEIGHT - 2 * GAUGE_INSET => Some(*width),
                    _ => None,
                })
                .collect()
        };

        assert_eq!(fills(100), vec![20]);
        assert_eq!(fills(50), vec![10]);
        assert!(fills(0).is_empty());
        assert_eq!(fills(250), vec![20]);
    }

    #[test]
    fn menu_highlights_cursor_row() {
        let rows = [
            MenuRowView {
                key: "Select Book",
                value: SettingValue::Label("Beyond-Order"),
            },
            MenuRowView {
                key: "Text Size",
                value: SettingValue::Number(2),
            },
            MenuRowView {
                key: "Exit Menu",
                value: SettingValue::Action,
            },
        ];
        let screen = Screen::Menu {
            title: "Menu",
            rows: &rows,
            cursor: 1,
        };

        let frame = compose(&screen, &landscape());
        let inverted: Vec<_> = frame
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text {
                    inverted: true,
                    text,
                    ..
                } => Some(text.as_str().to_string()),
                _ => None,
            })
            .collect();

        assert_eq!(
            frame.texts().collect::<Vec<_>>(),
            vec!["Menu", "Select Book: Beyond-Order", "Text Size: 2", "Exit Menu"]
        );
        assert_eq!(inverted, vec!["Text Size: 2"]);
    }

    #[test]
    fn status_is_centered() {
        let frame = compose(
            &Screen::Status {
                line1: "SLEEPING",
                line2: "",
            },
            &landscape(),
        );

        match &frame.commands[1] {
            DrawCommand::Text { origin, size, .. } => {
                assert_eq!(*size, 2);
                assert_eq!(origin.x, (296 - 8 * 12) / 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(frame.commands.len(), 3);
    }
}
