//! # Card Records
//!
//! One printed card as stored in the MTGJSON "AllSets" document, plus the
//! binding from its fields onto the template [`Field`] table.

use serde::{Deserialize, Deserializer};

use crate::core::template::{Field, FieldSource, FieldValue};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ruling {
    pub date: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Legality {
    pub format: String,
    pub legality: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForeignName {
    pub language: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub name: String,
    /// Names of all faces, for split and other multi-faced cards.
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default = "default_layout")]
    pub layout: String,
    pub mana_cost: Option<String>,
    pub cmc: Option<f64>,
    /// Current (oracle) type line.
    #[serde(rename = "type")]
    pub current_type: Option<String>,
    #[serde(rename = "originalType")]
    pub printed_type: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub power: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub toughness: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub loyalty: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub hand: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub life: Option<String>,
    pub flavor: Option<String>,
    #[serde(rename = "text")]
    pub oracle_text: Option<String>,
    #[serde(rename = "originalText")]
    pub printed_text: Option<String>,
    pub rarity: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub subtypes: Vec<String>,
    #[serde(default)]
    pub printings: Vec<String>,
    #[serde(default)]
    pub rulings: Vec<Ruling>,
    #[serde(default)]
    pub legalities: Vec<Legality>,
    #[serde(default)]
    pub foreign_names: Vec<ForeignName>,
}

fn default_layout() -> String {
    "normal".to_string()
}

/// MTGJSON stores power, hand modifiers etc. as numbers or strings ("*", "1+*").
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

impl CardRecord {
    pub fn is_split(&self) -> bool {
        self.layout == "split" && self.names.len() > 1
    }

    /// Name under which the whole split card is looked up: `"Fire // Ice"`.
    pub fn split_name(&self) -> String {
        self.names.join(" // ")
    }
}

/// `3.0` → `"3"`, `0.5` → `"0.5"`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn lines_of(text: &Option<String>) -> Vec<String> {
    text.as_deref()
        .map(|text| text.split('\n').map(str::to_string).collect())
        .unwrap_or_default()
}

impl FieldSource for CardRecord {
    fn field(&self, field: Field) -> FieldValue {
        let scalar = |value: &Option<String>| FieldValue::Scalar(value.clone());
        let list = |items: &[String]| FieldValue::List(items.to_vec());

        match field {
            Field::Name => FieldValue::Scalar(Some(self.name.clone())),
            Field::Names => list(&self.names),
            Field::Layout => FieldValue::Scalar(Some(self.layout.clone())),
            Field::ManaCost => scalar(&self.mana_cost),
            Field::Cmc => FieldValue::Scalar(self.cmc.map(format_number)),
            Field::Type => scalar(&self.current_type),
            Field::PrintedType => scalar(&self.printed_type),
            Field::Power => scalar(&self.power),
            Field::Toughness => scalar(&self.toughness),
            Field::Loyalty => scalar(&self.loyalty),
            Field::Hand => scalar(&self.hand),
            Field::Life => scalar(&self.life),
            Field::Flavor => FieldValue::List(lines_of(&self.flavor)),
            Field::Text => FieldValue::List(lines_of(&self.oracle_text)),
            Field::PrintedText => FieldValue::List(lines_of(&self.printed_text)),
            Field::Rarity => scalar(&self.rarity),
            Field::Colors => list(&self.colors),
            Field::ColorIdentity => list(&self.color_identity),
            Field::Supertypes => list(&self.supertypes),
            Field::Types => list(&self.types),
            Field::Subtypes => list(&self.subtypes),
            Field::Printings => list(&self.printings),
            Field::Rulings => FieldValue::List(
                self.rulings
                    .iter()
                    .map(|r| format!("{}: {}", r.date, r.text))
                    .collect(),
            ),
            Field::Legalities => FieldValue::List(
                self.legalities
                    .iter()
                    .map(|l| format!("{}: {}", l.format, l.legality))
                    .collect(),
            ),
            Field::ForeignNames => FieldValue::List(
                self.foreign_names
                    .iter()
                    .map(|f| format!("{}: {}", f.language, f.name))
                    .collect(),
            ),
        }
    }
}
