//! # Browser
//!
//! Owns both panes and mediates between them: a focus change in the list
//! pane loads the newly focused card into the description pane.
//!
//! ```text
//!            resize                 geometry recomputed
//! Running ────────────► ResizePending ─────────────────► Running
//!    │
//!    └── quit ──► Quitting
//! ```

use log::{debug, info};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::deck::DeckEntry;
use crate::core::prefetch::DescriptionSource;
use crate::tui::component::EventHandler;
use crate::tui::components::{DescriptionPaneState, ListEvent, ListPaneState};
use crate::tui::event::{EventBatch, TuiEvent};
use crate::tui::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserState {
    Running,
    /// A new terminal size is known but the panes still use the old one.
    ResizePending { width: u16, height: u16 },
    Quitting,
}

pub struct Browser<S: DescriptionSource> {
    list: ListPaneState,
    description: DescriptionPaneState,
    source: S,
    state: BrowserState,
    list_width: u16,
}

impl<S: DescriptionSource> Browser<S> {
    /// `entries` must already be in display order and non-empty.
    pub fn new(
        entries: Vec<DeckEntry>,
        has_sideboard: bool,
        source: S,
        list_width: u16,
        (width, height): (u16, u16),
    ) -> Self {
        let mut browser = Self {
            list: ListPaneState::new(entries, has_sideboard),
            description: DescriptionPaneState::new(),
            source,
            state: BrowserState::Running,
            list_width,
        };
        browser.apply_geometry(width, height);
        browser.load_focused();
        browser
    }

    pub fn state(&self) -> BrowserState {
        self.state
    }

    pub fn is_quitting(&self) -> bool {
        self.state == BrowserState::Quitting
    }

    pub fn list(&self) -> &ListPaneState {
        &self.list
    }

    pub fn description(&self) -> &DescriptionPaneState {
        &self.description
    }

    /// Apply one drained input batch. The (coalesced) resize goes first.
    pub fn handle_batch(&mut self, batch: EventBatch) {
        if let Some((width, height)) = batch.resize {
            self.request_resize(width, height);
            self.finish_resize();
        }
        for command in batch.commands {
            if self.is_quitting() {
                break;
            }
            self.dispatch(command);
        }
    }

    pub fn dispatch(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Quit => {
                info!("Browser quitting");
                self.state = BrowserState::Quitting;
            }
            TuiEvent::Resize(width, height) => {
                self.request_resize(width, height);
                self.finish_resize();
            }
            TuiEvent::FocusUp | TuiEvent::FocusDown => {
                if let Some(ListEvent::FocusChanged(index)) = self.list.handle_event(&event) {
                    debug!("Focus moved to entry {}", index);
                    self.load_focused();
                }
            }
            TuiEvent::ScrollUp | TuiEvent::ScrollDown => {
                self.description.handle_event(&event);
            }
        }
    }

    pub fn request_resize(&mut self, width: u16, height: u16) {
        if self.state == BrowserState::Quitting {
            return;
        }
        self.state = BrowserState::ResizePending { width, height };
    }

    /// Recompute both panes' geometry for the pending size.
    pub fn finish_resize(&mut self) {
        if let BrowserState::ResizePending { width, height } = self.state {
            info!("Terminal resized to {}x{}", width, height);
            self.apply_geometry(width, height);
            self.state = BrowserState::Running;
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        ui::draw_ui(frame, &mut self.list, &mut self.description, self.list_width);
    }

    fn apply_geometry(&mut self, width: u16, height: u16) {
        let areas = ui::pane_areas(Rect::new(0, 0, width, height), self.list_width);
        self.list.set_viewport_height(areas.list.height as usize);
        self.description.set_geometry(
            areas.description.width as usize,
            areas.description.height as usize,
        );
    }

    fn load_focused(&mut self) {
        if let Some(entry) = self.list.focused() {
            let description = self.source.describe(&entry.name);
            self.description.set_description(description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repository::RenderedDescription;
    use crate::tui::event::coalesce;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    /// Describes every card as its name followed by `rows` numbered lines.
    struct StubSource {
        rows: usize,
        calls: Vec<String>,
    }

    impl DescriptionSource for StubSource {
        fn describe(&mut self, name: &str) -> Arc<RenderedDescription> {
            self.calls.push(name.to_string());
            let mut lines = vec![name.to_string()];
            lines.extend((1..=self.rows).map(|i| format!("line {i}")));
            Arc::new(RenderedDescription::new(lines))
        }
    }

    fn entries(names: &[&str]) -> Vec<DeckEntry> {
        names
            .iter()
            .map(|name| DeckEntry {
                name: name.to_string(),
                count: 1,
                is_sideboard: false,
            })
            .collect()
    }

    fn browser(rows: usize, size: (u16, u16)) -> Browser<StubSource> {
        let source = StubSource {
            rows,
            calls: Vec::new(),
        };
        Browser::new(
            entries(&["Counterspell", "Forest", "Island"]),
            false,
            source,
            20,
            size,
        )
    }

    #[test]
    fn starts_running_on_first_entry() {
        let browser = browser(2, (80, 24));
        assert_eq!(browser.state(), BrowserState::Running);
        assert_eq!(browser.description().description().lines()[0], "Counterspell");
        assert_eq!(browser.source.calls, vec!["Counterspell"]);
    }

    #[test]
    fn focus_change_loads_and_resets_scroll() {
        let mut browser = browser(40, (80, 12));
        browser.dispatch(TuiEvent::ScrollDown);
        browser.dispatch(TuiEvent::ScrollDown);
        assert_eq!(browser.description().offset(), 2);

        browser.dispatch(TuiEvent::FocusDown);
        assert_eq!(browser.description().description().lines()[0], "Forest");
        assert_eq!(browser.description().offset(), 0);
    }

    #[test]
    fn focus_at_edge_does_not_reload() {
        let mut browser = browser(1, (80, 24));
        browser.dispatch(TuiEvent::FocusUp);
        assert_eq!(browser.source.calls.len(), 1);
    }

    #[test]
    fn resize_passes_through_pending_state() {
        let mut browser = browser(40, (80, 24));
        browser.dispatch(TuiEvent::FocusDown);
        browser.request_resize(60, 10);
        assert_eq!(
            browser.state(),
            BrowserState::ResizePending {
                width: 60,
                height: 10
            }
        );
        browser.finish_resize();
        assert_eq!(browser.state(), BrowserState::Running);
        assert_eq!(browser.list().viewport_height(), 9);
        assert_eq!(browser.list().focus(), 1);
        assert_eq!(browser.description().description().lines()[0], "Forest");
    }

    #[test]
    fn resize_clamps_description_scroll() {
        // 41 lines in a 39-column pane, viewport 11 rows
        let mut browser = browser(40, (60, 12));
        for _ in 0..100 {
            browser.dispatch(TuiEvent::ScrollDown);
        }
        assert_eq!(browser.description().offset(), 41 - 11);

        browser.dispatch(TuiEvent::Resize(60, 40));
        assert_eq!(browser.description().offset(), 41 - 39);
    }

    #[test]
    fn batch_applies_latest_resize_before_keys() {
        let mut browser = browser(0, (80, 24));
        browser.handle_batch(coalesce([
            TuiEvent::Resize(30, 5),
            TuiEvent::FocusDown,
            TuiEvent::Resize(50, 8),
            TuiEvent::FocusDown,
        ]));
        assert_eq!(browser.state(), BrowserState::Running);
        assert_eq!(browser.list().viewport_height(), 7);
        assert_eq!(browser.list().focus(), 2);
    }

    #[test]
    fn quit_stops_the_batch() {
        let mut browser = browser(0, (80, 24));
        browser.handle_batch(coalesce([TuiEvent::Quit, TuiEvent::FocusDown]));
        assert!(browser.is_quitting());
        assert_eq!(browser.list().focus(), 0);

        browser.request_resize(10, 10);
        assert_eq!(browser.state(), BrowserState::Quitting);
    }

    #[test]
    fn render_draws_both_panes_and_help() {
        let backend = TestBackend::new(60, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut browser = browser(1, (60, 6));

        terminal.draw(|f| browser.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String {
            (0..60).map(|x| buffer[(x, y)].symbol().to_string()).collect()
        };
        assert!(row(0).starts_with("1 Counterspell"));
        assert_eq!(buffer[(20, 0)].symbol(), "|");
        assert!(row(0)[21..].starts_with("Counterspell"));
        assert!(row(1)[21..].starts_with("line 1"));
        assert!(row(5).starts_with(r#"move up: "w""#));
        assert!(row(5)[21..].starts_with(r#"scroll up: "k""#));
    }
}
