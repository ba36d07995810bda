//! # TUI Adapter
//!
//! The ratatui-specific layer: the deck browser. Handles terminal I/O,
//! renders the panes and translates keyboard input into browser commands.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! Nothing animates, so the loop sleeps up to 500ms waiting for input and
//! only redraws after something arrived. Every event already queued behind
//! the first one is drained in the same pass; a flood of resize events
//! collapses into one geometry recompute.

mod browser;
mod component;
mod components;
mod event;
mod ui;

pub use browser::{Browser, BrowserState};
pub use event::{EventBatch, TuiEvent, coalesce};

use log::info;
use std::io::{self, stdout};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::deck::DeckEntry;
use crate::core::prefetch::{CachedDescriptions, DescriptionCache};
use crate::core::repository::CardRepository;
use crate::tui::event::read_batch;

const IDLE_POLL: Duration = Duration::from_millis(500);

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Event types let us ignore key releases; terminals without the
        // protocol ignore the request.
        execute!(
            stdout(),
            Hide,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (hidden cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags, Show);
    }
}

/// Browse `entries` (in display order) until the user quits.
///
/// Descriptions come from `cache`, which a background prefetcher may be
/// filling at the same time; misses are looked up on this thread.
pub fn run(
    repository: &CardRepository,
    entries: Vec<DeckEntry>,
    has_sideboard: bool,
    cache: DescriptionCache,
    list_width: u16,
) -> io::Result<()> {
    let session = repository.open().map_err(io::Error::other)?;
    let source = CachedDescriptions::new(cache, session);

    let mut terminal = ratatui::init();
    let terminal_mode_guard = TerminalModeGuard::new();

    let result = (|| -> io::Result<()> {
        let size = terminal.size()?;
        let mut browser = Browser::new(
            entries,
            has_sideboard,
            source,
            list_width,
            (size.width, size.height),
        );
        info!("Browser started with {} entries", browser.list().entries().len());

        let mut needs_redraw = true; // Force first frame
        loop {
            if needs_redraw {
                terminal.draw(|f| browser.render(f))?;
                needs_redraw = false;
            }

            let batch = read_batch(IDLE_POLL)?;
            if batch.is_empty() {
                continue;
            }
            needs_redraw = true;
            browser.handle_batch(batch);

            if browser.is_quitting() {
                return Ok(());
            }
        }
    })();

    drop(terminal_mode_guard);
    ratatui::restore();
    result
}
