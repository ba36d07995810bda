//! # Deck Lists
//!
//! Parses deck files in either of two common text formats:
//!
//! ```text
//! Inline prefix               Sideboard section
//! -------------               -----------------
//! // Burn                     4 Lightning Bolt
//! 4 Lightning Bolt            20 Mountain
//! 20 Mountain                 Sideboard
//! SB: 2 Smash to Smithereens  2 Smash to Smithereens
//! ```
//!
//! The inline format is tried first; when it rejects the file the section
//! format gets a go. Repeated `(name, sideboard)` pairs are merged by summing
//! their counts, so each pair appears once in the result, at the position of
//! its first occurrence.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};

const SIDEBOARD_PREFIX: &str = "SB:";
const SIDEBOARD_MARKER: &str = "Sideboard";
const COMMENT_PREFIX: &str = "//";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub name: String,
    pub count: u32,
    pub is_sideboard: bool,
}

/// Writes the entry back out as an inline-prefix deck line.
impl fmt::Display for DeckEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sideboard {
            write!(f, "{SIDEBOARD_PREFIX} {} {}", self.count, self.name)
        } else {
            write!(f, "{} {}", self.count, self.name)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckFormat {
    /// Sideboard cards carry an `SB:` prefix.
    Inline,
    /// Everything after a `Sideboard` line is sideboard.
    Section,
}

impl fmt::Display for DeckFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckFormat::Inline => write!(f, "inline-prefix"),
            DeckFormat::Section => write!(f, "sideboard-section"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeck {
    pub entries: Vec<DeckEntry>,
    pub has_sideboard: bool,
    pub format: DeckFormat,
}

impl ParsedDeck {
    /// Entries as the browser lists them: main deck before sideboard, each
    /// group alphabetical by name.
    pub fn display_order(&self) -> Vec<DeckEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| (a.is_sideboard, &a.name).cmp(&(b.is_sideboard, &b.name)));
        entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarErrorKind {
    /// The line is neither blank, a comment, nor a card line.
    Malformed,
    /// A second `Sideboard` marker; `first` is the line of the first one.
    DuplicateSideboardMarker { first: usize },
    /// A `Sideboard` marker with no card lines after it.
    EmptySideboard,
    /// Merging this line's count into an earlier entry overflows.
    CountOverflow,
}

/// Why one grammar rejected a deck file. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    pub format: DeckFormat,
    pub line: usize,
    pub kind: GrammarErrorKind,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} format, line {}: ", self.format, self.line)?;
        match (&self.kind, self.format) {
            (GrammarErrorKind::Malformed, DeckFormat::Inline) => {
                write!(f, "expected '[SB:] <count> <card name>'")
            }
            (GrammarErrorKind::Malformed, DeckFormat::Section) => {
                write!(f, "expected '<count> <card name>' or '{SIDEBOARD_MARKER}'")
            }
            (GrammarErrorKind::DuplicateSideboardMarker { first }, _) => write!(
                f,
                "more than one {SIDEBOARD_MARKER} line (first one on line {first})"
            ),
            (GrammarErrorKind::EmptySideboard, _) => {
                write!(f, "{SIDEBOARD_MARKER} declared but no cards follow it")
            }
            (GrammarErrorKind::CountOverflow, _) => {
                write!(f, "total count for this card exceeds {}", u32::MAX)
            }
        }
    }
}

#[derive(Debug)]
pub enum DeckError {
    Io(io::Error),
    /// Neither grammar accepted the file.
    Malformed {
        inline: GrammarError,
        section: GrammarError,
    },
    /// The file is valid but lists no cards.
    Empty,
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::Io(e) => write!(f, "cannot read deck file: {e}"),
            DeckError::Malformed { inline, section } => {
                write!(f, "Deck file malformed:\n  {inline}\n  {section}")
            }
            DeckError::Empty => write!(f, "Deck empty."),
        }
    }
}

impl std::error::Error for DeckError {}

/// Read and parse a deck file.
pub fn parse_deck_file(path: &Path) -> Result<ParsedDeck, DeckError> {
    let contents = fs::read_to_string(path).map_err(DeckError::Io)?;
    let lines: Vec<&str> = contents.lines().collect();
    parse_deck(&lines)
}

/// Parse deck lines, trying the inline-prefix format before the
/// sideboard-section format.
pub fn parse_deck<S: AsRef<str>>(lines: &[S]) -> Result<ParsedDeck, DeckError> {
    let inline = match parse_inline(lines) {
        Ok(deck) => return non_empty(deck),
        Err(e) => e,
    };
    debug!("Inline-prefix deck format rejected: {}", inline);

    let section = match parse_section(lines) {
        Ok(deck) => return non_empty(deck),
        Err(e) => e,
    };
    info!("Deck rejected by both formats");
    Err(DeckError::Malformed { inline, section })
}

fn non_empty(deck: ParsedDeck) -> Result<ParsedDeck, DeckError> {
    if deck.entries.is_empty() {
        return Err(DeckError::Empty);
    }
    debug!(
        "Parsed deck ({} format): {} entries, sideboard: {}",
        deck.format,
        deck.entries.len(),
        deck.has_sideboard
    );
    Ok(deck)
}

enum DeckLine<'a> {
    Blank,
    Comment,
    /// Trimmed line content.
    Content(&'a str),
}

fn classify(raw: &str) -> DeckLine<'_> {
    let line = raw.trim();
    if line.is_empty() {
        DeckLine::Blank
    } else if line.starts_with(COMMENT_PREFIX) {
        DeckLine::Comment
    } else {
        DeckLine::Content(line)
    }
}

/// `"4 Lightning Bolt"` → `(4, "Lightning Bolt")`. The count must be
/// positive and separated from the name by whitespace.
fn parse_card_line(text: &str) -> Option<(u32, &str)> {
    let text = text.trim();
    let digits_end = text.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let (digits, rest) = text.split_at(digits_end);
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim();
    let count: u32 = digits.parse().ok()?;
    if count == 0 || name.is_empty() {
        return None;
    }
    Some((count, name))
}

/// Accumulates entries, merging repeats of the same `(name, sideboard)` pair.
#[derive(Default)]
struct EntryList {
    entries: Vec<DeckEntry>,
    index: HashMap<(String, bool), usize>,
}

impl EntryList {
    fn add(&mut self, name: &str, count: u32, is_sideboard: bool) -> Result<(), GrammarErrorKind> {
        match self.index.get(&(name.to_string(), is_sideboard)) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.count = entry
                    .count
                    .checked_add(count)
                    .ok_or(GrammarErrorKind::CountOverflow)?;
            }
            None => {
                self.index
                    .insert((name.to_string(), is_sideboard), self.entries.len());
                self.entries.push(DeckEntry {
                    name: name.to_string(),
                    count,
                    is_sideboard,
                });
            }
        }
        Ok(())
    }
}

fn parse_inline<S: AsRef<str>>(lines: &[S]) -> Result<ParsedDeck, GrammarError> {
    let mut list = EntryList::default();

    for (i, raw) in lines.iter().enumerate() {
        let DeckLine::Content(line) = classify(raw.as_ref()) else {
            continue;
        };
        let (rest, is_sideboard) = match line.strip_prefix(SIDEBOARD_PREFIX) {
            Some(rest) => (rest, true),
            None => (line, false),
        };
        let Some((count, name)) = parse_card_line(rest) else {
            return Err(GrammarError {
                format: DeckFormat::Inline,
                line: i + 1,
                kind: GrammarErrorKind::Malformed,
            });
        };
        list.add(name, count, is_sideboard).map_err(|kind| GrammarError {
            format: DeckFormat::Inline,
            line: i + 1,
            kind,
        })?;
    }

    let has_sideboard = list.entries.iter().any(|e| e.is_sideboard);
    Ok(ParsedDeck {
        entries: list.entries,
        has_sideboard,
        format: DeckFormat::Inline,
    })
}

fn parse_section<S: AsRef<str>>(lines: &[S]) -> Result<ParsedDeck, GrammarError> {
    let error = |line, kind| GrammarError {
        format: DeckFormat::Section,
        line,
        kind,
    };

    let mut list = EntryList::default();
    let mut marker_line: Option<usize> = None;
    let mut sideboard_cards = 0usize;

    for (i, raw) in lines.iter().enumerate() {
        let DeckLine::Content(line) = classify(raw.as_ref()) else {
            continue;
        };
        if line == SIDEBOARD_MARKER {
            if let Some(first) = marker_line {
                return Err(error(
                    i + 1,
                    GrammarErrorKind::DuplicateSideboardMarker { first },
                ));
            }
            marker_line = Some(i + 1);
            continue;
        }
        let Some((count, name)) = parse_card_line(line) else {
            return Err(error(i + 1, GrammarErrorKind::Malformed));
        };
        let is_sideboard = marker_line.is_some();
        if is_sideboard {
            sideboard_cards += 1;
        }
        list.add(name, count, is_sideboard).map_err(|kind| error(i + 1, kind))?;
    }

    if let Some(line) = marker_line
        && sideboard_cards == 0
    {
        return Err(error(line, GrammarErrorKind::EmptySideboard));
    }

    Ok(ParsedDeck {
        entries: list.entries,
        has_sideboard: marker_line.is_some(),
        format: DeckFormat::Section,
    })
}
