//! # HelpBar Component
//!
//! One reverse-video row naming a pane's keys. Stateless: the text is a prop.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub const LIST_HELP: &str = r#"move up: "w"; move down: "s""#;
pub const DESCRIPTION_HELP: &str = r#"scroll up: "k"; scroll down: "j"; quit: "q""#;

pub struct HelpBar {
    pub text: &'static str,
}

impl HelpBar {
    pub fn new(text: &'static str) -> Self {
        Self { text }
    }
}

impl Component for HelpBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let reversed = Style::default().add_modifier(Modifier::REVERSED);
        // The style covers the whole row, not just the text
        let bar = Paragraph::new(Line::raw(self.text)).style(reversed);
        frame.render_widget(bar, area);
    }
}
