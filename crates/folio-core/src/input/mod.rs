//! Input abstraction layer.

mod scripted;

pub use scripted::ScriptedInput;

/// Logical button presses consumed by the reader app.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputEvent {
    Next,
    Prev,
    Menu,
}

impl InputEvent {
    pub const ALL: [Self; 3] = [Self::Next, Self::Prev, Self::Menu];
}

/// Polled input provider.
pub trait InputProvider {
    type Error: core::fmt::Debug;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error>;
}
