//! # Card Store
//!
//! Read access to the local card database. The rest of the crate only sees
//! the [`CardStore`] / [`StoreSession`] traits; a session is a scoped handle
//! that is released when dropped.
//!
//! [`JsonCardStore`] is the bundled implementation. It loads an MTGJSON
//! "AllSets" document (set code → `{name, releaseDate, cards}`), which has to
//! be downloaded beforehand, and indexes it in memory:
//!
//! ```text
//! card name ──► [(set, card), ...]          one entry per set
//! "Fire // Ice" ──► [(set, [Fire, Ice])]    synthetic split-card entries
//! foreign name ──► [(language, english name), ...]
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;

use crate::core::card::CardRecord;

/// File name of the MTGJSON dump inside the data directory.
pub const DATA_FILE_NAME: &str = "AllSets-x.json";

#[derive(Debug)]
pub enum StoreError {
    /// No card data where we looked for it.
    Unavailable(PathBuf),
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(path) => write!(
                f,
                "no card data at {} (download {DATA_FILE_NAME} from mtgjson.com \
                 and place it there)",
                path.display()
            ),
            StoreError::Io(e) => write!(f, "card data I/O error: {e}"),
            StoreError::Parse(e) => write!(f, "card data parse error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, PartialEq)]
pub struct SetInfo {
    pub code: String,
    pub name: String,
    /// Missing for a handful of promotional sets.
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintedCard {
    Single(CardRecord),
    /// The faces of a split card, in printed order.
    Split(Vec<CardRecord>),
}

/// A card as printed in one set.
#[derive(Debug, Clone, PartialEq)]
pub struct Printing {
    pub set: SetInfo,
    pub card: PrintedCard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub language: String,
    /// The card's English name.
    pub name: String,
}

pub trait CardStore: Send + Sync {
    /// Open a session. It stays open until dropped.
    fn connect(&self) -> Result<Box<dyn StoreSession>, StoreError>;
}

pub trait StoreSession: Send {
    /// Every printing of the card called `name`, at most one per set.
    fn printings(&self, name: &str) -> Result<Vec<Printing>, StoreError>;

    /// English names of cards that are called `foreign_name` in some language.
    fn translations(&self, foreign_name: &str) -> Result<Vec<Translation>, StoreError>;
}

// ============================================================================
// JSON-backed store
// ============================================================================

#[derive(Deserialize)]
struct SetData {
    #[serde(default)]
    name: String,
    #[serde(rename = "releaseDate", default)]
    release_date: Option<NaiveDate>,
    #[serde(default)]
    cards: Vec<CardRecord>,
}

#[derive(Default)]
struct Catalog {
    sets: Vec<SetInfo>,
    by_name: HashMap<String, Vec<(usize, PrintedCard)>>,
    translations: HashMap<String, Vec<Translation>>,
}

impl Catalog {
    fn build(sets: BTreeMap<String, SetData>) -> Self {
        let mut catalog = Catalog::default();

        for (code, set) in sets {
            let set_index = catalog.sets.len();
            catalog.sets.push(SetInfo {
                code,
                name: set.name,
                release_date: set.release_date,
            });

            let mut seen = HashSet::new();
            for card in &set.cards {
                if card.is_split() {
                    let split_name = card.split_name();
                    if seen.insert(split_name.clone()) {
                        let faces = card
                            .names
                            .iter()
                            .filter_map(|face| set.cards.iter().find(|c| &c.name == face))
                            .cloned()
                            .collect();
                        catalog
                            .by_name
                            .entry(split_name)
                            .or_default()
                            .push((set_index, PrintedCard::Split(faces)));
                    }
                }

                for foreign in &card.foreign_names {
                    let translation = Translation {
                        language: foreign.language.clone(),
                        name: card.name.clone(),
                    };
                    let known = catalog
                        .translations
                        .entry(foreign.name.clone())
                        .or_default();
                    if !known.contains(&translation) {
                        known.push(translation);
                    }
                }
            }

            // Alternate-art duplicates within a set collapse to the first one.
            for card in set.cards {
                if seen.insert(card.name.clone()) {
                    catalog
                        .by_name
                        .entry(card.name.clone())
                        .or_default()
                        .push((set_index, PrintedCard::Single(card)));
                }
            }
        }

        catalog
    }
}

/// In-memory card store loaded from an MTGJSON "AllSets" document.
pub struct JsonCardStore {
    catalog: Arc<Catalog>,
    open_sessions: Arc<AtomicUsize>,
}

impl JsonCardStore {
    /// Returns `~/.mtgtool/AllSets-x.json`.
    pub fn default_path() -> Option<PathBuf> {
        crate::core::config::data_dir().map(|dir| dir.join(DATA_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::Unavailable(path.to_path_buf()));
        }
        let file = File::open(path).map_err(StoreError::Io)?;
        let store = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded {} sets ({} card names) from {}",
            store.catalog.sets.len(),
            store.catalog.by_name.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let sets: BTreeMap<String, SetData> =
            serde_json::from_reader(reader).map_err(StoreError::Parse)?;
        Ok(Self::from_sets(sets))
    }

    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let sets: BTreeMap<String, SetData> =
            serde_json::from_str(json).map_err(StoreError::Parse)?;
        Ok(Self::from_sets(sets))
    }

    fn from_sets(sets: BTreeMap<String, SetData>) -> Self {
        Self {
            catalog: Arc::new(Catalog::build(sets)),
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of sessions currently open against this store.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }
}

impl CardStore for JsonCardStore {
    fn connect(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        let open = self.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Store session opened ({} open)", open);
        Ok(Box::new(JsonSession {
            catalog: Arc::clone(&self.catalog),
            open_sessions: Arc::clone(&self.open_sessions),
        }))
    }
}

struct JsonSession {
    catalog: Arc<Catalog>,
    open_sessions: Arc<AtomicUsize>,
}

impl StoreSession for JsonSession {
    fn printings(&self, name: &str) -> Result<Vec<Printing>, StoreError> {
        Ok(self
            .catalog
            .by_name
            .get(name)
            .map(|printings| {
                printings
                    .iter()
                    .map(|(set_index, card)| Printing {
                        set: self.catalog.sets[*set_index].clone(),
                        card: card.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn translations(&self, foreign_name: &str) -> Result<Vec<Translation>, StoreError> {
        Ok(self
            .catalog
            .translations
            .get(foreign_name)
            .cloned()
            .unwrap_or_default())
    }
}

impl Drop for JsonSession {
    fn drop(&mut self) {
        let open = self.open_sessions.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!("Store session closed ({} open)", open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{SAMPLE_SETS_JSON, sample_store};

    #[test]
    fn test_printings_one_per_set() {
        let store = sample_store();
        let session = store.connect().unwrap();
        let printings = session.printings("Counterspell").unwrap();
        let sets: Vec<&str> = printings.iter().map(|p| p.set.code.as_str()).collect();
        assert_eq!(sets, vec!["LEA", "TPR"]);
        assert_eq!(
            printings[1].set.release_date,
            NaiveDate::from_ymd_opt(2015, 5, 6)
        );
    }

    #[test]
    fn test_alternate_art_collapses() {
        let store = sample_store();
        let session = store.connect().unwrap();
        let forests = session.printings("Forest").unwrap();
        assert_eq!(forests.len(), 1);
    }

    #[test]
    fn test_unknown_name_has_no_printings() {
        let store = sample_store();
        let session = store.connect().unwrap();
        assert!(session.printings("Black Lotus Jr.").unwrap().is_empty());
    }

    #[test]
    fn test_split_card_entry() {
        let store = sample_store();
        let session = store.connect().unwrap();
        let printings = session.printings("Fire // Ice").unwrap();
        assert_eq!(printings.len(), 1);
        let PrintedCard::Split(faces) = &printings[0].card else {
            panic!("expected a split card");
        };
        let names: Vec<&str> = faces.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Fire", "Ice"]);
        // The faces stay individually searchable.
        assert_eq!(session.printings("Ice").unwrap().len(), 1);
    }

    #[test]
    fn test_translations_deduplicated() {
        let store = sample_store();
        let session = store.connect().unwrap();
        let translations = session.translations("Gegenzauber").unwrap();
        assert_eq!(
            translations,
            vec![Translation {
                language: "German".to_string(),
                name: "Counterspell".to_string()
            }]
        );
        assert!(session.translations("Nope").unwrap().is_empty());
    }

    #[test]
    fn test_sessions_are_counted_until_dropped() {
        let store = sample_store();
        assert_eq!(store.open_sessions(), 0);
        let first = store.connect().unwrap();
        let second = store.connect().unwrap();
        assert_eq!(store.open_sessions(), 2);
        drop(first);
        assert_eq!(store.open_sessions(), 1);
        drop(second);
        assert_eq!(store.open_sessions(), 0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DATA_FILE_NAME);
        std::fs::write(&path, SAMPLE_SETS_JSON).unwrap();
        let store = JsonCardStore::load(&path).unwrap();
        let session = store.connect().unwrap();
        assert_eq!(session.printings("Counterspell").unwrap().len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_unavailable() {
        let err = JsonCardStore::load(Path::new("/nowhere/AllSets-x.json")).err().unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.to_string().contains("mtgjson.com"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = JsonCardStore::from_json_str("{\"LEA\": 3}").err().unwrap();
        assert!(matches!(err, StoreError::Parse(_)));
    }
}
