/// Input the browser understands, independent of the terminal backend.
///
/// With the `crossterm` feature, `Input` implements `From<Event>` for
/// crossterm events. Hosts using another backend build `Input` values
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    /// Move the selection up.
    Up,
    /// Move the selection down.
    Down,
    /// Select the first entry.
    Home,
    /// Select the last entry.
    End,
    /// Move the selection up by a page.
    PageUp,
    /// Move the selection down by a page.
    PageDown,
    /// Close the file page, or go back to the parent directory.
    Left,
    /// Open the selected directory or file.
    Right,
    /// Delete the selected entry.
    Delete,
    /// Do nothing.
    None,
}

#[cfg(feature = "crossterm")]
mod crossterm {
    use super::Input;
    use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

    impl From<&KeyEvent> for Input {
        fn from(key: &KeyEvent) -> Self {
            if key.kind != KeyEventKind::Press {
                return Self::None;
            }

            match key.code {
                KeyCode::Char('k') | KeyCode::Up => Self::Up,
                KeyCode::Char('j') | KeyCode::Down => Self::Down,
                KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace | KeyCode::Esc => {
                    Self::Left
                }
                KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => Self::Right,
                KeyCode::Char('g') | KeyCode::Home => Self::Home,
                KeyCode::Char('G') | KeyCode::End => Self::End,
                KeyCode::PageUp => Self::PageUp,
                KeyCode::PageDown => Self::PageDown,
                KeyCode::Char('d') | KeyCode::Delete => Self::Delete,
                _ => Self::None,
            }
        }
    }

    impl From<&Event> for Input {
        fn from(event: &Event) -> Self {
            match event {
                Event::Key(key) => Self::from(key),
                _ => Self::None,
            }
        }
    }

    impl From<Event> for Input {
        fn from(event: Event) -> Self {
            Self::from(&event)
        }
    }

}
