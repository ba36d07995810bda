//! # Card Repository
//!
//! Turns a card name (and optionally a set code) into a rendered
//! description, on top of a [`CardStore`] and a validated [`Template`].
//!
//! Selection rules:
//! - an explicit set must be one the card was printed in;
//! - without one, the printing from the most recently released set wins;
//! - split cards render each face in turn, separated by a `//` line.
//!
//! Informational notes (which printing was picked, that a card is split) are
//! leading lines of the description unless the repository is quiet.

use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use crate::core::store::{CardStore, PrintedCard, Printing, StoreError, StoreSession, Translation};
use crate::core::template::Template;

pub const MULTIPLE_PRINTINGS_NOTE: &str = concat!(
    "There are multiple printings of this card in different sets. ",
    "Showing the printing of newest set: "
);
pub const SPLIT_NOTE: &str = "Card is split:";
pub const FACE_DIVIDER: &str = "//";

/// A card rendered into display lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedDescription {
    lines: Vec<String>,
}

impl RenderedDescription {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl From<&LookupError> for RenderedDescription {
    fn from(error: &LookupError) -> Self {
        Self::new(vec![error.to_string()])
    }
}

impl fmt::Display for RenderedDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

#[derive(Debug)]
pub enum LookupError {
    UnknownCard(String),
    /// A set was requested that the card was never printed in.
    SetNotAmongPrintings { name: String, set: String },
    Store(StoreError),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::UnknownCard(name) => write!(f, "Unknown card: {name}"),
            LookupError::SetNotAmongPrintings { set, .. } => {
                write!(f, "Set {set} not among sets this card is featured in.")
            }
            LookupError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LookupError {}

pub struct CardRepository {
    store: Arc<dyn CardStore>,
    template: Template,
    quiet: bool,
}

impl CardRepository {
    pub fn new(store: Arc<dyn CardStore>, template: Template, quiet: bool) -> Self {
        Self {
            store,
            template,
            quiet,
        }
    }

    /// Open a session against the store. Each thread uses its own.
    pub fn open(&self) -> Result<RepositorySession<'_>, StoreError> {
        Ok(RepositorySession {
            repository: self,
            session: self.store.connect()?,
        })
    }
}

/// A repository bound to one open store session; closes it when dropped.
pub struct RepositorySession<'a> {
    repository: &'a CardRepository,
    session: Box<dyn StoreSession>,
}

impl RepositorySession<'_> {
    pub fn resolve(
        &self,
        name: &str,
        set: Option<&str>,
    ) -> Result<RenderedDescription, LookupError> {
        let printings = self.session.printings(name).map_err(LookupError::Store)?;

        let chosen = match set {
            Some(code) => printings.iter().find(|p| p.set.code == code).ok_or_else(|| {
                LookupError::SetNotAmongPrintings {
                    name: name.to_string(),
                    set: code.to_string(),
                }
            })?,
            None => newest(&printings).ok_or_else(|| LookupError::UnknownCard(name.to_string()))?,
        };
        debug!("Resolved '{}' to its {} printing", name, chosen.set.code);

        let mut lines = Vec::new();
        if set.is_none() && printings.len() > 1 {
            info!(
                "'{}' has {} printings, showing {}",
                name,
                printings.len(),
                chosen.set.code
            );
            self.note(&mut lines, format!("{MULTIPLE_PRINTINGS_NOTE}{}", chosen.set.code));
        }

        let template = &self.repository.template;
        match &chosen.card {
            PrintedCard::Single(card) => lines.extend(template.render_lines(card)),
            PrintedCard::Split(faces) => {
                self.note(&mut lines, SPLIT_NOTE.to_string());
                for (i, face) in faces.iter().enumerate() {
                    if i > 0 {
                        lines.push(FACE_DIVIDER.to_string());
                    }
                    lines.extend(template.render_lines(face));
                }
            }
        }

        Ok(RenderedDescription::new(lines))
    }

    pub fn translate(&self, foreign_name: &str) -> Result<Vec<Translation>, StoreError> {
        self.session.translations(foreign_name)
    }

    fn note(&self, lines: &mut Vec<String>, note: String) {
        if !self.repository.quiet {
            lines.push(note);
        }
    }
}

/// Printing from the latest release; undated sets count as oldest.
fn newest(printings: &[Printing]) -> Option<&Printing> {
    printings.iter().max_by_key(|p| p.set.release_date)
}
