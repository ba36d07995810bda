use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;
use crate::tui::components::help_bar::{DESCRIPTION_HELP, LIST_HELP};
use crate::tui::components::{
    DescriptionPane, DescriptionPaneState, HelpBar, ListPane, ListPaneState,
};

const SEPARATOR: &str = "|";

/// Screen regions of the browser.
///
/// ```text
/// ┌── list ──┐│┌──── description ────┐
/// │          │││                     │
/// └──────────┘│└─────────────────────┘
///  list help  | description help        ← last row
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneAreas {
    pub list: Rect,
    pub separator: Rect,
    pub description: Rect,
    pub list_help: Rect,
    pub description_help: Rect,
}

pub fn pane_areas(area: Rect, list_width: u16) -> PaneAreas {
    use Constraint::{Length, Min};
    let [body, help] = Layout::vertical([Min(0), Length(1)]).areas(area);
    let columns = Layout::horizontal([Length(list_width), Length(1), Min(0)]);
    let [list, separator, description] = columns.areas(body);
    let [list_help, _, description_help] = columns.areas(help);

    PaneAreas {
        list,
        // The separator runs through the help row as well
        separator: Rect::new(separator.x, area.y, separator.width, area.height),
        description,
        list_help,
        description_help,
    }
}

pub fn draw_ui(
    frame: &mut Frame,
    list: &mut ListPaneState,
    description: &mut DescriptionPaneState,
    list_width: u16,
) {
    let areas = pane_areas(frame.area(), list_width);

    ListPane::new(list).render(frame, areas.list);
    DescriptionPane::new(description).render(frame, areas.description);

    let separator: Vec<Line> = (0..areas.separator.height)
        .map(|_| Line::raw(SEPARATOR))
        .collect();
    frame.render_widget(Paragraph::new(separator), areas.separator);

    HelpBar::new(LIST_HELP).render(frame, areas.list_help);
    HelpBar::new(DESCRIPTION_HELP).render(frame, areas.description_help);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pane_areas() {
        let areas = pane_areas(Rect::new(0, 0, 80, 24), 30);
        assert_eq!(areas.list, Rect::new(0, 0, 30, 23));
        assert_eq!(areas.separator, Rect::new(30, 0, 1, 24));
        assert_eq!(areas.description, Rect::new(31, 0, 49, 23));
        assert_eq!(areas.list_help, Rect::new(0, 23, 30, 1));
        assert_eq!(areas.description_help, Rect::new(31, 23, 49, 1));
    }
}
