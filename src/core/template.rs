//! # Template Engine
//!
//! Renders a card into free-form text. A template is plain text containing
//! `%field%` or `%field|filter%` markers; `%%` stands for a literal percent sign.
//!
//! ```text
//! "NAME: %name%\nCOLOR: %colors|comma%"   →   "NAME: Counterspell\nCOLOR: Blue"
//! ```
//!
//! ## Validation
//!
//! Every field a template may reference lives in the fixed [`Field`] table,
//! tagged as scalar or list. [`Template::parse`] checks the whole template
//! up front (unterminated markers, unknown fields and filters, filter/kind
//! mismatches), so a `Template` value is always renderable. Rendering never
//! fails and never consults the shape of the caller's values: it branches on
//! the table's kind.

use std::collections::HashMap;
use std::fmt;

/// Rendered in place of a scalar field that has no value.
pub const MISSING_VALUE: &str = "None";

/// Built-in template, laid out like the classic `LABEL: value` card dump.
pub const DEFAULT_TEMPLATE: &str = "NAME: %name%
NAMES: %names|comma%
LAYOUT: %layout%
MANA COST: %mana_cost%
CONVERTED MANA COST: %cmc%
CURRENT TYPE: %type%
PRINTED TYPE: %printed_type%
POWER: %power%
TOUGHNESS: %toughness%
LOYALTY: %loyalty%
MAX HAND SIZE MODIFIER: %hand%
STARTING LIFE TOTAL MODIFIER: %life%
FLAVOR:
%flavor|indent%
ORACLE TEXT:
%text|indent%
PRINTED TEXT:
%printed_text|indent%
RARITY: %rarity%
COLOR: %colors|comma%
COLOR IDENTITY: %color_identity|comma%
SUPERTYPES: %supertypes|comma%
TYPES: %types|comma%
SUBTYPES: %subtypes|comma%
PRINTINGS: %printings|comma%
RULINGS:
%rulings|indent%
LEGALITIES:
%legalities|indent%
FOREIGN NAMES:
%foreign_names|indent%";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    List,
}

/// Every field a template can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Names,
    Layout,
    ManaCost,
    Cmc,
    Type,
    PrintedType,
    Power,
    Toughness,
    Loyalty,
    Hand,
    Life,
    Flavor,
    Text,
    PrintedText,
    Rarity,
    Colors,
    ColorIdentity,
    Supertypes,
    Types,
    Subtypes,
    Printings,
    Rulings,
    Legalities,
    ForeignNames,
}

impl Field {
    pub const ALL: [Field; 25] = [
        Field::Name,
        Field::Names,
        Field::Layout,
        Field::ManaCost,
        Field::Cmc,
        Field::Type,
        Field::PrintedType,
        Field::Power,
        Field::Toughness,
        Field::Loyalty,
        Field::Hand,
        Field::Life,
        Field::Flavor,
        Field::Text,
        Field::PrintedText,
        Field::Rarity,
        Field::Colors,
        Field::ColorIdentity,
        Field::Supertypes,
        Field::Types,
        Field::Subtypes,
        Field::Printings,
        Field::Rulings,
        Field::Legalities,
        Field::ForeignNames,
    ];

    /// The name used inside template markers.
    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Names => "names",
            Field::Layout => "layout",
            Field::ManaCost => "mana_cost",
            Field::Cmc => "cmc",
            Field::Type => "type",
            Field::PrintedType => "printed_type",
            Field::Power => "power",
            Field::Toughness => "toughness",
            Field::Loyalty => "loyalty",
            Field::Hand => "hand",
            Field::Life => "life",
            Field::Flavor => "flavor",
            Field::Text => "text",
            Field::PrintedText => "printed_text",
            Field::Rarity => "rarity",
            Field::Colors => "colors",
            Field::ColorIdentity => "color_identity",
            Field::Supertypes => "supertypes",
            Field::Types => "types",
            Field::Subtypes => "subtypes",
            Field::Printings => "printings",
            Field::Rulings => "rulings",
            Field::Legalities => "legalities",
            Field::ForeignNames => "foreign_names",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Names
            | Field::Flavor
            | Field::Text
            | Field::PrintedText
            | Field::Colors
            | Field::ColorIdentity
            | Field::Supertypes
            | Field::Types
            | Field::Subtypes
            | Field::Printings
            | Field::Rulings
            | Field::Legalities
            | Field::ForeignNames => FieldKind::List,
            _ => FieldKind::Scalar,
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }
}

/// Formatting applied to list-valued fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// `a, b, c`
    Comma,
    /// One element per line, each indented by two spaces.
    Indent,
}

impl Filter {
    pub const ALL: [Filter; 2] = [Filter::Comma, Filter::Indent];

    /// The name used after the `|` in a template marker.
    pub fn name(self) -> &'static str {
        match self {
            Filter::Comma => "comma",
            Filter::Indent => "indent",
        }
    }

    pub fn from_name(name: &str) -> Option<Filter> {
        Self::ALL.iter().copied().find(|filter| filter.name() == name)
    }

    /// `comma or indent`, for error messages.
    fn choices() -> String {
        Self::ALL.map(Filter::name).join(" or ")
    }

    pub fn apply(self, items: &[String]) -> String {
        match self {
            Filter::Comma => items.join(", "),
            Filter::Indent => items
                .iter()
                .map(|item| format!("  {item}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A value handed to the engine for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Option<String>),
    List(Vec<String>),
}

impl FieldValue {
    fn into_scalar(self) -> String {
        match self {
            FieldValue::Scalar(Some(value)) => value,
            FieldValue::Scalar(None) => MISSING_VALUE.to_string(),
            FieldValue::List(items) => items.join(", "),
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            FieldValue::Scalar(value) => value.into_iter().collect(),
            FieldValue::List(items) => items,
        }
    }
}

/// Anything that can supply field values to a template.
pub trait FieldSource {
    fn field(&self, field: Field) -> FieldValue;
}

/// A plain field map. Missing keys count as absent values.
impl FieldSource for HashMap<Field, FieldValue> {
    fn field(&self, field: Field) -> FieldValue {
        match self.get(&field) {
            Some(value) => value.clone(),
            None => match field.kind() {
                FieldKind::Scalar => FieldValue::Scalar(None),
                FieldKind::List => FieldValue::List(Vec::new()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `%` with no closing `%`. `offset` is the byte offset of the opener.
    Unterminated { offset: usize },
    UnknownField(String),
    UnknownFilter { field: String, filter: String },
    /// A filter attached to a scalar field.
    FilterOnScalar { field: String, filter: String },
    /// A list field used without a filter.
    MissingFilter(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Unterminated { offset } => {
                write!(f, "unterminated field marker at byte {offset}")
            }
            TemplateError::UnknownField(field) => write!(f, "unknown field '{field}'"),
            TemplateError::UnknownFilter { field, filter } => {
                write!(
                    f,
                    "unknown filter '{filter}' on field '{field}' (expected {})",
                    Filter::choices()
                )
            }
            TemplateError::FilterOnScalar { field, filter } => {
                write!(f, "filter '{filter}' applied to scalar field '{field}'")
            }
            TemplateError::MissingFilter(field) => {
                write!(f, "list field '{field}' needs a filter ({})", Filter::choices())
            }
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Scalar(Field),
    List(Field, Filter),
}

/// A validated template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse and validate a template.
    ///
    /// Scans left to right. After a `%%` or a marker, scanning resumes right
    /// past the closing `%`, so emitted text is never scanned twice.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;
        let mut offset = 0;

        while let Some(open) = rest.find('%') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('%') else {
                return Err(TemplateError::Unterminated {
                    offset: offset + open,
                });
            };

            let marker = &after[..close];
            if marker.is_empty() {
                literal.push('%');
            } else {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(parse_marker(marker)?);
            }

            let consumed = open + close + 2;
            rest = &rest[consumed..];
            offset += consumed;
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Fields referenced by this template, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Literal(_) => None,
            Segment::Scalar(field) | Segment::List(field, _) => Some(*field),
        })
    }

    pub fn render<S: FieldSource + ?Sized>(&self, source: &S) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Scalar(field) => out.push_str(&source.field(*field).into_scalar()),
                Segment::List(field, filter) => {
                    out.push_str(&filter.apply(&source.field(*field).into_list()))
                }
            }
        }
        out
    }

    /// Render and split into display lines.
    pub fn render_lines<S: FieldSource + ?Sized>(&self, source: &S) -> Vec<String> {
        self.render(source)
            .split('\n')
            .map(str::to_string)
            .collect()
    }
}

fn parse_marker(marker: &str) -> Result<Segment, TemplateError> {
    let (field_name, filter_name) = match marker.split_once('|') {
        Some((field, filter)) => (field, Some(filter)),
        None => (marker, None),
    };

    let field = Field::from_name(field_name)
        .ok_or_else(|| TemplateError::UnknownField(field_name.to_string()))?;

    match (field.kind(), filter_name) {
        (FieldKind::Scalar, None) => Ok(Segment::Scalar(field)),
        (FieldKind::List, None) => Err(TemplateError::MissingFilter(field_name.to_string())),
        (kind, Some(filter_name)) => {
            let filter = Filter::from_name(filter_name).ok_or_else(|| TemplateError::UnknownFilter {
                field: field_name.to_string(),
                filter: filter_name.to_string(),
            })?;
            if kind == FieldKind::Scalar {
                return Err(TemplateError::FilterOnScalar {
                    field: field_name.to_string(),
                    filter: filter_name.to_string(),
                });
            }
            Ok(Segment::List(field, filter))
        }
    }
}

/// Parse `template` and render `source` with it in one step.
pub fn render<S: FieldSource + ?Sized>(
    template: &str,
    source: &S,
) -> Result<String, TemplateError> {
    Ok(Template::parse(template)?.render(source))
}
