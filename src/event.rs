//! Event system - input events, input sources, and crossterm conversion

use crate::layout::Point;
use anyhow::Result;
use std::collections::VecDeque;

/// Keyboard key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    F(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    BackTab,
    Backspace,
    Delete,
    Insert,
    Enter,
    Tab,
    Esc,
    Null,
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CONTROL: Modifiers = Modifiers(1 << 1);
    pub const ALT: Modifiers = Modifiers(1 << 2);
    pub const SUPER: Modifiers = Modifiers(1 << 3);

    /// Whether every modifier in `other` is held
    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// A key going down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Text produced by the key, if any
    pub character: Option<char>,
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// Key press without modifiers
    pub fn new(key: Key) -> Self {
        let character = match key {
            Key::Char(c) => Some(c),
            _ => None,
        };
        KeyPress {
            key,
            character,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// UI events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The host asked to close the application
    Close,
    /// Output surface resized (new width, new height in pixels)
    Resize(u32, u32),
    /// Pointer moved, with or without a button held
    PointerMove(Point),
    /// Pointer button pressed
    PointerDown(MouseButton, Point),
    /// Pointer button released
    PointerUp(MouseButton, Point),
    /// Key pressed
    Key(KeyPress),
}

/// Source of raw input events, polled once per frame
pub trait InputSource {
    /// Every event that arrived since the last poll, in order
    fn poll(&mut self) -> Result<Vec<Event>>;
}

/// Scripted input, drained on every poll
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: VecDeque<Event>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next poll
    pub fn push(&mut self, event: Event) {
        self.pending.push_back(event);
    }

    /// Queue several events for the next poll
    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.pending.extend(events);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl InputSource for InputQueue {
    fn poll(&mut self) -> Result<Vec<Event>> {
        Ok(self.pending.drain(..).collect())
    }
}

#[cfg(feature = "tui")]
pub use self::poller::EventPoller;

#[cfg(feature = "tui")]
mod poller {
    use super::{Event, InputSource, Key, KeyPress, Modifiers, MouseButton};
    use crate::layout::Point;
    use anyhow::Result;
    use std::time::Duration;

    /// Event polling and conversion from crossterm events
    ///
    /// Terminal cells are mapped to canvas pixels through `cell_size`; pointer
    /// positions land on the center of the cell.
    pub struct EventPoller {
        cell_size: (u32, u32),
    }

    impl EventPoller {
        /// Enable raw mode and mouse capture
        pub fn new(cell_size: (u32, u32)) -> Result<Self> {
            crossterm::terminal::enable_raw_mode()?;

            // Mouse capture is best effort
            let _ = crossterm::execute!(std::io::stdout(), crossterm::event::EnableMouseCapture);

            Ok(EventPoller { cell_size })
        }

        fn convert(&self, event: crossterm::event::Event) -> Option<Event> {
            convert_crossterm_event(event, self.cell_size)
        }
    }

    impl InputSource for EventPoller {
        fn poll(&mut self) -> Result<Vec<Event>> {
            let mut events = Vec::new();
            while crossterm::event::poll(Duration::ZERO)? {
                let event = crossterm::event::read()?;
                if let Some(event) = self.convert(event) {
                    events.push(event);
                }
            }
            Ok(events)
        }
    }

    impl Drop for EventPoller {
        fn drop(&mut self) {
            let _ = crossterm::execute!(std::io::stdout(), crossterm::event::DisableMouseCapture);
            let _ = crossterm::terminal::disable_raw_mode();
        }
    }

    fn cell_center(col: u16, row: u16, (cell_w, cell_h): (u32, u32)) -> Point {
        Point::new(
            (col as f32 + 0.5) * cell_w as f32,
            (row as f32 + 0.5) * cell_h as f32,
        )
    }

    /// Convert crossterm event to our Event type
    pub(super) fn convert_crossterm_event(
        event: crossterm::event::Event,
        cell_size: (u32, u32),
    ) -> Option<Event> {
        use crossterm::event::{Event as CEvent, KeyCode, KeyEventKind, MouseEventKind};

        match event {
            CEvent::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    return None;
                }
                let modifiers = convert_modifiers(key.modifiers);
                if modifiers.contains(Modifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
                {
                    return Some(Event::Close);
                }
                let key = convert_key(key.code);
                let character = match key {
                    Key::Char(c) if !modifiers.contains(Modifiers::CONTROL) => Some(c),
                    _ => None,
                };
                Some(Event::Key(KeyPress {
                    key,
                    character,
                    modifiers,
                }))
            }
            CEvent::Mouse(me) => {
                let pos = cell_center(me.column, me.row, cell_size);
                match me.kind {
                    MouseEventKind::Down(btn) => Some(Event::PointerDown(convert_button(btn), pos)),
                    MouseEventKind::Up(btn) => Some(Event::PointerUp(convert_button(btn), pos)),
                    MouseEventKind::Drag(_) | MouseEventKind::Moved => Some(Event::PointerMove(pos)),
                    _ => None,
                }
            }
            CEvent::Resize(cols, rows) => Some(Event::Resize(
                cols as u32 * cell_size.0,
                rows as u32 * cell_size.1,
            )),
            _ => None,
        }
    }

    fn convert_button(button: crossterm::event::MouseButton) -> MouseButton {
        match button {
            crossterm::event::MouseButton::Left => MouseButton::Left,
            crossterm::event::MouseButton::Right => MouseButton::Right,
            crossterm::event::MouseButton::Middle => MouseButton::Middle,
        }
    }

    fn convert_modifiers(mods: crossterm::event::KeyModifiers) -> Modifiers {
        use crossterm::event::KeyModifiers;

        let mut out = Modifiers::NONE;
        if mods.contains(KeyModifiers::SHIFT) {
            out = out | Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            out = out | Modifiers::CONTROL;
        }
        if mods.contains(KeyModifiers::ALT) {
            out = out | Modifiers::ALT;
        }
        if mods.contains(KeyModifiers::SUPER) {
            out = out | Modifiers::SUPER;
        }
        out
    }

    /// Convert crossterm key code to our Key type
    fn convert_key(code: crossterm::event::KeyCode) -> Key {
        use crossterm::event::KeyCode;

        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::F(n) => Key::F(n),
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Insert => Key::Insert,
            KeyCode::Enter => Key::Enter,
            KeyCode::Tab => Key::Tab,
            KeyCode::Esc => Key::Esc,
            _ => Key::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_queue_drains() {
        let mut queue = InputQueue::new();
        queue.push(Event::Close);
        queue.push(Event::Resize(10, 20));

        assert_eq!(
            queue.poll().unwrap(),
            vec![Event::Close, Event::Resize(10, 20)]
        );
        assert!(queue.is_empty());
        assert!(queue.poll().unwrap().is_empty());
    }

    #[test]
    fn test_key_press_character() {
        assert_eq!(KeyPress::new(Key::Char('a')).character, Some('a'));
        assert_eq!(KeyPress::new(Key::Enter).character, None);
    }

    #[test]
    fn test_modifiers() {
        let mods = Modifiers::SHIFT | Modifiers::ALT;
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(mods.contains(Modifiers::ALT));
        assert!(!mods.contains(Modifiers::CONTROL));
        assert!(Modifiers::NONE.is_empty());
    }

    #[cfg(feature = "tui")]
    mod crossterm_conversion {
        use super::super::poller::convert_crossterm_event;
        use super::super::*;
        use crossterm::event::{
            Event as CEvent, KeyCode, KeyEvent, KeyModifiers, MouseButton as CButton,
            MouseEvent, MouseEventKind,
        };

        fn mouse(kind: MouseEventKind, column: u16, row: u16) -> CEvent {
            CEvent::Mouse(MouseEvent {
                kind,
                column,
                row,
                modifiers: KeyModifiers::NONE,
            })
        }

        #[test]
        fn test_ctrl_c_closes() {
            let event = CEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
            assert_eq!(convert_crossterm_event(event, (1, 2)), Some(Event::Close));
        }

        #[test]
        fn test_key_conversion() {
            let event = CEvent::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::SHIFT));
            let Some(Event::Key(press)) = convert_crossterm_event(event, (1, 2)) else {
                panic!("expected a key event");
            };
            assert_eq!(press.key, Key::Char('x'));
            assert_eq!(press.character, Some('x'));
            assert!(press.modifiers.contains(Modifiers::SHIFT));
        }

        #[test]
        fn test_mouse_maps_to_cell_center() {
            let event = mouse(MouseEventKind::Down(CButton::Left), 3, 4);
            assert_eq!(
                convert_crossterm_event(event, (1, 2)),
                Some(Event::PointerDown(MouseButton::Left, Point::new(3.5, 9.0)))
            );

            let event = mouse(MouseEventKind::Drag(CButton::Left), 0, 0);
            assert_eq!(
                convert_crossterm_event(event, (10, 20)),
                Some(Event::PointerMove(Point::new(5.0, 10.0)))
            );
        }

        #[test]
        fn test_scroll_ignored() {
            let event = mouse(MouseEventKind::ScrollUp, 0, 0);
            assert_eq!(convert_crossterm_event(event, (1, 2)), None);
        }

        #[test]
        fn test_resize_in_pixels() {
            assert_eq!(
                convert_crossterm_event(CEvent::Resize(80, 24), (1, 2)),
                Some(Event::Resize(80, 48))
            );
        }
    }
}
