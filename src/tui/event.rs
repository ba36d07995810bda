use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// TUI-specific input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiEvent {
    FocusUp,
    FocusDown,
    ScrollUp,
    ScrollDown,
    Quit,
    /// New terminal size (columns, rows).
    Resize(u16, u16),
}

/// One drained batch of input: at most one resize, then the key commands in
/// arrival order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EventBatch {
    pub resize: Option<(u16, u16)>,
    pub commands: Vec<TuiEvent>,
}

impl EventBatch {
    pub fn is_empty(&self) -> bool {
        self.resize.is_none() && self.commands.is_empty()
    }
}

/// Collapse a burst of events: every resize but the latest is dropped.
pub fn coalesce(events: impl IntoIterator<Item = TuiEvent>) -> EventBatch {
    let mut batch = EventBatch::default();
    for event in events {
        match event {
            TuiEvent::Resize(width, height) => batch.resize = Some((width, height)),
            command => batch.commands.push(command),
        }
    }
    batch
}

/// Whether another event is already waiting
fn event_pending() -> io::Result<bool> {
    event::poll(Duration::ZERO)
}

/// Wait up to `timeout` for input, then drain everything else already queued.
pub fn read_batch(timeout: Duration) -> io::Result<EventBatch> {
    if !event::poll(timeout)? {
        return Ok(EventBatch::default());
    }
    let mut events = Vec::new();
    events.extend(translate(event::read()?));
    while event_pending()? {
        events.extend(translate(event::read()?));
    }
    Ok(coalesce(events))
}

/// Map a terminal event onto a browser command. Unbound keys map to nothing.
pub fn translate(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key_event) => translate_key(key_event),
        Event::Resize(width, height) => Some(TuiEvent::Resize(width, height)),
        _ => None,
    }
}

fn translate_key(key_event: KeyEvent) -> Option<TuiEvent> {
    // Enhanced terminals also report releases; a held key repeats
    if key_event.kind == KeyEventKind::Release {
        return None;
    }
    log::debug!(
        "Key event: {:?} with modifiers {:?}",
        key_event.code,
        key_event.modifiers
    );
    match (key_event.modifiers, key_event.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::Quit),
        (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => Some(TuiEvent::Quit),
        (_, KeyCode::Char('w')) | (_, KeyCode::Up) => Some(TuiEvent::FocusUp),
        (_, KeyCode::Char('s')) | (_, KeyCode::Down) => Some(TuiEvent::FocusDown),
        (_, KeyCode::Char('k')) | (_, KeyCode::PageUp) => Some(TuiEvent::ScrollUp),
        (_, KeyCode::Char('j')) | (_, KeyCode::PageDown) => Some(TuiEvent::ScrollDown),
        _ => None,
    }
}
