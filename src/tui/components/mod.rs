//! # TUI Components
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `HelpBar`: reverse-video key hints under each pane
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in a `*State` struct owned by the browser and
//! implements `EventHandler`; a transient component borrows it each frame to
//! render:
//! - `ListPaneState` / `ListPane`: deck entries, focus, auto-scroll
//! - `DescriptionPaneState` / `DescriptionPane`: the focused card's text,
//!   row layout cache, scroll
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs               (this file)
//! ├── help_bar.rs          (Bottom key hints)
//! ├── list_pane.rs         (Deck list)
//! └── description_pane/    (Card description + text layout helpers)
//! ```

pub mod description_pane;
pub mod help_bar;
pub mod list_pane;

pub use description_pane::{DescriptionPane, DescriptionPaneState};
pub use help_bar::HelpBar;
pub use list_pane::{ListEvent, ListPane, ListPaneState};
