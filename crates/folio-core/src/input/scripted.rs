use super::{InputEvent, InputProvider};

/// Replays a fixed sequence of presses; used by tests and bring-up without buttons.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedInput<'a> {
    events: &'a [InputEvent],
    cursor: usize,
}

impl<'a> ScriptedInput<'a> {
    pub const fn new(events: &'a [InputEvent]) -> Self {
        Self { events, cursor: 0 }
    }

    pub const fn remaining(&self) -> usize {
        self.events.len().saturating_sub(self.cursor)
    }
}

impl InputProvider for ScriptedInput<'_> {
    type Error = core::convert::Infallible;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        let Some(event) = self.events.get(self.cursor).copied() else {
            return Ok(None);
        };
        self.cursor = self.cursor.saturating_add(1);
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_then_drains() {
        let events = [InputEvent::Next, InputEvent::Menu];
        let mut input = ScriptedInput::new(&events);

        assert_eq!(input.poll_event(), Ok(Some(InputEvent::Next)));
        assert_eq!(input.remaining(), 1);
        assert_eq!(input.poll_event(), Ok(Some(InputEvent::Menu)));
        assert_eq!(input.poll_event(), Ok(None));
        assert_eq!(input.remaining(), 0);
    }
}
