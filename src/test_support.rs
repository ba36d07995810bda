//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::io;
use std::sync::Arc;

use crate::core::repository::CardRepository;
use crate::core::store::{CardStore, JsonCardStore, Printing, StoreError, StoreSession, Translation};
use crate::core::template::{DEFAULT_TEMPLATE, Template};

/// A tiny MTGJSON "AllSets" document: two printings of Counterspell
/// (1993 and 2015), an alternate-art Forest, and the split card Fire // Ice.
pub const SAMPLE_SETS_JSON: &str = r#"{
  "LEA": {
    "name": "Limited Edition Alpha",
    "releaseDate": "1993-08-05",
    "cards": [
      {
        "name": "Counterspell",
        "layout": "normal",
        "manaCost": "{U}{U}",
        "cmc": 2,
        "type": "Instant",
        "originalType": "Interrupt",
        "text": "Counter target spell.",
        "rarity": "Uncommon",
        "colors": ["Blue"],
        "colorIdentity": ["U"],
        "types": ["Instant"],
        "printings": ["LEA", "TPR"],
        "foreignNames": [{"language": "German", "name": "Gegenzauber"}]
      },
      {"name": "Forest", "layout": "normal", "type": "Basic Land — Forest", "rarity": "Basic Land"},
      {"name": "Forest", "layout": "normal", "type": "Basic Land — Forest", "rarity": "Basic Land"}
    ]
  },
  "TPR": {
    "name": "Tempest Remastered",
    "releaseDate": "2015-05-06",
    "cards": [
      {
        "name": "Counterspell",
        "layout": "normal",
        "manaCost": "{U}{U}",
        "cmc": 2,
        "type": "Instant",
        "text": "Counter target spell.",
        "rarity": "Common",
        "colors": ["Blue"],
        "printings": ["LEA", "TPR"],
        "foreignNames": [{"language": "German", "name": "Gegenzauber"}]
      }
    ]
  },
  "APC": {
    "name": "Apocalypse",
    "releaseDate": "2001-06-04",
    "cards": [
      {
        "name": "Fire",
        "names": ["Fire", "Ice"],
        "layout": "split",
        "manaCost": "{1}{R}",
        "type": "Instant",
        "text": "Fire deals 2 damage divided as you choose.",
        "rarity": "Uncommon"
      },
      {
        "name": "Ice",
        "names": ["Fire", "Ice"],
        "layout": "split",
        "manaCost": "{1}{U}",
        "type": "Instant",
        "text": "Tap target permanent.\nDraw a card.",
        "rarity": "Uncommon"
      }
    ]
  }
}"#;

pub fn sample_store() -> Arc<JsonCardStore> {
    Arc::new(JsonCardStore::from_json_str(SAMPLE_SETS_JSON).expect("sample JSON parses"))
}

/// Repository over [`sample_store`] with a compact one-line template.
pub fn sample_repository(quiet: bool) -> (Arc<JsonCardStore>, CardRepository) {
    let store = sample_store();
    let template = Template::parse("%name% (%rarity%)").expect("template parses");
    let repository = CardRepository::new(store.clone(), template, quiet);
    (store, repository)
}

/// Repository over [`BrokenStore`] with the built-in template.
pub fn broken_repository() -> CardRepository {
    let template = Template::parse(DEFAULT_TEMPLATE).expect("default template parses");
    CardRepository::new(Arc::new(BrokenStore), template, false)
}

/// A store whose sessions fail every query, for error propagation tests.
pub struct BrokenStore;

struct BrokenSession;

impl CardStore for BrokenStore {
    fn connect(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        Ok(Box::new(BrokenSession))
    }
}

impl StoreSession for BrokenSession {
    fn printings(&self, _name: &str) -> Result<Vec<Printing>, StoreError> {
        Err(StoreError::Io(io::Error::other("disk on fire")))
    }

    fn translations(&self, _foreign_name: &str) -> Result<Vec<Translation>, StoreError> {
        Err(StoreError::Io(io::Error::other("disk on fire")))
    }
}
