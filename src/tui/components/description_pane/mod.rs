//! # DescriptionPane Component
//!
//! The focused card's rendered description, laid out into rows of the pane
//! width and scrolled one row at a time.
//!
//! The row layout is cached in [`DescriptionPaneState`] and rebuilt only
//! when the description or the pane width changes.

pub mod text_layout;

use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::core::repository::RenderedDescription;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use self::text_layout::layout_lines;

#[derive(Default)]
pub struct DescriptionPaneState {
    description: Arc<RenderedDescription>,
    rows: Vec<String>,
    width: usize,
    viewport_height: usize,
    offset: usize,
}

impl DescriptionPaneState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show another description, from the top.
    pub fn set_description(&mut self, description: Arc<RenderedDescription>) {
        self.description = description;
        self.rows = layout_lines(self.description.lines(), self.width);
        self.offset = 0;
    }

    pub fn set_geometry(&mut self, width: usize, height: usize) {
        if width != self.width {
            self.width = width;
            self.rows = layout_lines(self.description.lines(), width);
        }
        self.viewport_height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn description(&self) -> &RenderedDescription {
        &self.description
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn content_height(&self) -> usize {
        self.rows.len()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn max_offset(&self) -> usize {
        self.content_height().saturating_sub(self.viewport_height)
    }

    pub fn scroll_up(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.offset < self.max_offset() {
            self.offset += 1;
        }
    }
}

impl EventHandler for DescriptionPaneState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => self.scroll_up(),
            TuiEvent::ScrollDown => self.scroll_down(),
            _ => {}
        }
        None
    }
}

pub struct DescriptionPane<'a> {
    pub state: &'a mut DescriptionPaneState,
}

impl<'a> DescriptionPane<'a> {
    pub fn new(state: &'a mut DescriptionPaneState) -> Self {
        Self { state }
    }
}

impl Component for DescriptionPane<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state
            .set_geometry(area.width as usize, area.height as usize);

        let width = area.width as usize;
        let viewport = self.state.viewport_height;
        let reversed = Style::default().add_modifier(Modifier::REVERSED);

        let mut lines: Vec<Line> = self
            .state
            .rows
            .iter()
            .skip(self.state.offset)
            .take(viewport)
            .map(|row| Line::raw(row.as_str()))
            .collect();

        if viewport > 0 {
            if self.state.offset > 0 {
                lines[0] = Line::styled("^".repeat(width), reversed);
            }
            if self.state.offset < self.state.max_offset() {
                lines[viewport - 1] = Line::styled("v".repeat(width), reversed);
            }
        }

        frame.render_widget(Paragraph::new(lines), area);
    }
}
