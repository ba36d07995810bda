//! # Core Application Logic
//!
//! Everything mtgtool knows about cards and decks. It knows nothing about
//! any specific UI technology.
//!
//! ```text
//!   deck file ──► deck ──► names ─────────────┐
//!                                             ▼
//!   AllSets-x.json ──► store ──► repository ──► prefetch cache ──► TUI
//!                                   ▲
//!                  config ──► template
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `~/.mtgtool/config.toml` and the override hierarchy
//! - [`template`]: the `%field|filter%` description language
//! - [`card`]: one printed card and its template fields
//! - [`store`]: the card database behind a session-scoped trait
//! - [`repository`]: printing selection and description rendering
//! - [`deck`]: the two deck file grammars
//! - [`prefetch`]: the background description cache

pub mod card;
pub mod config;
pub mod deck;
pub mod prefetch;
pub mod repository;
pub mod store;
pub mod template;
