//! Native value tree.
//!
//! Values are constructed per deserialize call, replaced (never mutated in
//! place) through the clean pipeline, and discarded after serialization.
//! Definitions are shared; values are not.

use indexmap::IndexMap;
use serde_json::{json, Value as Json};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

/// Wire formats for the date/time leaf kinds. ISO-style, matching what a
/// JSON encoder produces for date objects.
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
pub(crate) const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");
pub(crate) const DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
/// Accepted on input only; serialization always uses the `T` separator.
pub(crate) const DATETIME_SPACE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Short kind tag for a JSON value, used in error messages.
pub(crate) fn json_kind(raw: &Json) -> &'static str {
    match raw {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Reference to an externally-owned entity, resolved by identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: String,
    pub title: String,
}

impl Entity {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// One element of a stream: a declared variant name paired with a value.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamChild {
    pub block_type: String,
    pub value: Value,
}

impl StreamChild {
    pub fn new(block_type: impl Into<String>, value: Value) -> Self {
        Self {
            block_type: block_type.into(),
            value,
        }
    }
}

/// Ordered sequence of (variant, value) pairs — the root composition kind.
///
/// `raw_text` preserves legacy non-JSON stored content verbatim: such
/// content decomposes to an empty sequence but serializes back to the
/// original text, so pre-migration data survives a round trip untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamValue {
    items: Vec<StreamChild>,
    raw_text: Option<String>,
}

impl StreamValue {
    pub fn new(items: Vec<StreamChild>) -> Self {
        Self {
            items,
            raw_text: None,
        }
    }

    /// An empty stream carrying unparseable legacy content.
    pub fn legacy(raw_text: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            raw_text: Some(raw_text.into()),
        }
    }

    pub fn items(&self) -> &[StreamChild] {
        &self.items
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Empty means no decomposed items; a raw-text fallback does not count.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, block_type: impl Into<String>, value: Value) {
        self.items.push(StreamChild::new(block_type, value));
    }
}

impl FromIterator<StreamChild> for StreamValue {
    fn from_iter<I: IntoIterator<Item = StreamChild>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Fixed-shape mapping from declared child name to value. Key order is
/// declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructValue(IndexMap<String, Value>);

impl StructValue {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for StructValue {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A block's native value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(Date),
    Time(Time),
    DateTime(PrimitiveDateTime),
    Entity(Entity),
    Struct(StructValue),
    List(Vec<Value>),
    Stream(StreamValue),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Short kind tag used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Entity(_) => "entity",
            Value::Struct(_) => "struct",
            Value::List(_) => "list",
            Value::Stream(_) => "stream",
        }
    }

    /// Whether the value counts as empty for required-ness checks.
    ///
    /// `Bool(false)` is empty: a required boolean block means the box must
    /// be ticked, matching checkbox form semantics. Structs are never
    /// empty — their children carry their own required flags.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Stream(stream) => stream.is_empty(),
            _ => false,
        }
    }

    /// Schema-independent JSON projection, used for render contexts and
    /// definition descriptors. Serialization proper goes through each
    /// definition's `get_prep_value`.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => json!(b),
            Value::Int(n) => json!(n),
            Value::Float(n) => json!(n),
            Value::Text(s) => json!(s),
            Value::Date(d) => d
                .format(DATE_FORMAT)
                .map(Json::String)
                .unwrap_or(Json::Null),
            Value::Time(t) => t
                .format(TIME_FORMAT)
                .map(Json::String)
                .unwrap_or(Json::Null),
            Value::DateTime(dt) => dt
                .format(DATETIME_FORMAT)
                .map(Json::String)
                .unwrap_or(Json::Null),
            Value::Entity(entity) => json!({ "id": entity.id, "title": entity.title }),
            Value::Struct(sv) => {
                let mut map = serde_json::Map::new();
                for (name, value) in sv.iter() {
                    map.insert(name.to_string(), value.to_json());
                }
                Json::Object(map)
            }
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Stream(stream) => Json::Array(
                stream
                    .items()
                    .iter()
                    .map(|child| json!([child.block_type, child.value.to_json()]))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    #[test]
    fn struct_value_preserves_insertion_order() {
        let mut sv = StructValue::new();
        sv.insert("zebra", Value::text("z"));
        sv.insert("apple", Value::text("a"));
        sv.insert("mango", Value::text("m"));
        let keys: Vec<_> = sv.iter().map(|(name, _)| name).collect();
        assert_eq!(keys, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn emptiness_follows_required_semantics() {
        assert!(Value::Null.is_empty());
        assert!(Value::Bool(false).is_empty());
        assert!(Value::text("").is_empty());
        assert!(Value::List(Vec::new()).is_empty());
        assert!(Value::Stream(StreamValue::default()).is_empty());

        assert!(!Value::Bool(true).is_empty());
        assert!(!Value::Int(0).is_empty());
        assert!(!Value::Struct(StructValue::new()).is_empty());
        // a raw-text-only stream has no items, so it still counts as empty
        assert!(Value::Stream(StreamValue::legacy("old text")).is_empty());
    }

    #[test]
    fn json_projection_formats_temporal_values() {
        assert_eq!(
            Value::Date(date!(2024 - 03 - 09)).to_json(),
            json!("2024-03-09")
        );
        assert_eq!(Value::Time(time!(13:05:00)).to_json(), json!("13:05:00"));
        assert_eq!(
            Value::DateTime(datetime!(2024-03-09 13:05:00)).to_json(),
            json!("2024-03-09T13:05:00")
        );
    }

    #[test]
    fn json_projection_nests_containers_in_order() {
        let mut sv = StructValue::new();
        sv.insert("title", Value::text("hello"));
        sv.insert("count", Value::Int(3));
        let stream = StreamValue::new(vec![StreamChild::new("para", Value::Struct(sv))]);
        assert_eq!(
            Value::Stream(stream).to_json(),
            json!([["para", { "title": "hello", "count": 3 }]])
        );
    }
}
