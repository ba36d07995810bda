//! # ListPane Component
//!
//! The deck list on the left: one line per entry, one of them focused.
//!
//! `ListPane` is a transient component (created each frame) that wraps
//! `&'a mut ListPaneState` (persistent focus and scroll state).
//!
//! ## Auto-scroll
//!
//! With `H` entries, a viewport of `V` lines and focus `f`:
//!
//! ```text
//! offset = 0          if V >= H or f < V/2       (top pinned)
//!        = H - V      if f > max(0, H - V/2 - 1) (bottom pinned)
//!        = f - V/2    otherwise                  (focus centered)
//! ```
//!
//! The offset is recomputed from scratch after every focus move and resize.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::core::deck::DeckEntry;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::description_pane::text_layout::{display_width, truncate};
use crate::tui::event::TuiEvent;

const SIDEBOARD_COLUMN: &str = "SB: ";
const MAIN_COLUMN: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    /// Focus moved to this entry index.
    FocusChanged(usize),
}

/// Focus and scroll state for the deck list.
pub struct ListPaneState {
    entries: Vec<DeckEntry>,
    has_sideboard: bool,
    count_width: usize,
    focus: usize,
    offset: usize,
    viewport_height: usize,
}

impl ListPaneState {
    /// `entries` must already be in display order.
    pub fn new(entries: Vec<DeckEntry>, has_sideboard: bool) -> Self {
        let count_width = entries
            .iter()
            .map(|e| e.count.to_string().len())
            .max()
            .unwrap_or(1);
        Self {
            entries,
            has_sideboard,
            count_width,
            focus: 0,
            offset: 0,
            viewport_height: 0,
        }
    }

    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused(&self) -> Option<&DeckEntry> {
        self.entries.get(self.focus)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
        self.auto_scroll();
    }

    /// Returns whether the focus moved.
    pub fn move_up(&mut self) -> bool {
        if self.focus == 0 {
            return false;
        }
        self.focus -= 1;
        self.auto_scroll();
        true
    }

    pub fn move_down(&mut self) -> bool {
        if self.focus + 1 >= self.entries.len() {
            return false;
        }
        self.focus += 1;
        self.auto_scroll();
        true
    }

    fn auto_scroll(&mut self) {
        let height = self.entries.len();
        let viewport = self.viewport_height;
        let half = viewport / 2;
        let scroll_end = height.saturating_sub(half + 1);

        self.offset = if viewport >= height || self.focus < half {
            0
        } else if self.focus > scroll_end {
            height - viewport
        } else {
            self.focus - half
        };
    }

    /// The text of one list line: `[SB: ]<count> <name>`, cut to `width`.
    pub fn line_text(&self, index: usize, width: usize) -> String {
        let Some(entry) = self.entries.get(index) else {
            return String::new();
        };
        let column = match (self.has_sideboard, entry.is_sideboard) {
            (false, _) => "",
            (true, true) => SIDEBOARD_COLUMN,
            (true, false) => MAIN_COLUMN,
        };
        let line = format!(
            "{column}{:>count_width$} {}",
            entry.count,
            entry.name,
            count_width = self.count_width
        );
        truncate(&line, width)
    }

    fn has_more_below(&self) -> bool {
        self.offset + self.viewport_height < self.entries.len()
    }
}

impl EventHandler for ListPaneState {
    type Event = ListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let moved = match event {
            TuiEvent::FocusUp => self.move_up(),
            TuiEvent::FocusDown => self.move_down(),
            _ => false,
        };
        moved.then_some(ListEvent::FocusChanged(self.focus))
    }
}

pub struct ListPane<'a> {
    pub state: &'a mut ListPaneState,
}

impl<'a> ListPane<'a> {
    pub fn new(state: &'a mut ListPaneState) -> Self {
        Self { state }
    }
}

impl Component for ListPane<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.set_viewport_height(area.height as usize);

        let width = area.width as usize;
        let reversed = Style::default().add_modifier(Modifier::REVERSED);
        let last_row = self.state.viewport_height.saturating_sub(1);

        let lines: Vec<Line> = (0..self.state.viewport_height)
            .map(|row| {
                // Overflow markers take the first/last row when there is more
                if row == 0 && self.state.offset > 0 {
                    return Line::styled("^".repeat(width), reversed);
                }
                if row == last_row && self.state.has_more_below() {
                    return Line::styled("v".repeat(width), reversed);
                }
                let index = self.state.offset + row;
                let text = self.state.line_text(index, width);
                if index == self.state.focus {
                    let pad = width.saturating_sub(display_width(&text));
                    Line::styled(format!("{text}{}", " ".repeat(pad)), reversed)
                } else {
                    Line::raw(text)
                }
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);
    }
}
