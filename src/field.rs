//! Leaf field blocks.
//!
//! Each leaf wraps one primitive value kind and supplies JSON
//! deserialization, serialization, validation, and its contribution to
//! search indexing. Leaves are the closed set of variants at the bottom of
//! every block tree; containers never hold anything else directly.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value as Json};
use time::{Date, PrimitiveDateTime, Time};

use crate::error::{ConfigError, ValidationError};
use crate::value::{
    json_kind, Entity, Value, DATETIME_FORMAT, DATETIME_SPACE_FORMAT, DATE_FORMAT, TIME_FORMAT,
};

/// Lookup seam for reference leaves. Implementations resolve an external
/// identifier to an entity, returning `None` when it no longer exists.
pub trait EntityResolver: Send + Sync {
    fn resolve(&self, id: &str) -> Option<Entity>;
}

fn text_from_json(raw: &Json, expected: &'static str) -> Result<Value, ConfigError> {
    match raw {
        Json::Null => Ok(Value::Null),
        Json::String(s) => Ok(Value::Text(s.clone())),
        other => Err(ConfigError::ValueKind {
            expected,
            found: json_kind(other),
        }),
    }
}

fn text_to_json(value: &Value, expected: &'static str) -> Result<Json, ConfigError> {
    match value {
        Value::Null => Ok(Json::Null),
        Value::Text(s) => Ok(json!(s)),
        other => Err(ConfigError::ValueKind {
            expected,
            found: other.kind(),
        }),
    }
}

fn clean_text_length(
    text: &str,
    min_length: Option<usize>,
    max_length: Option<usize>,
) -> Result<(), ValidationError> {
    let chars = text.chars().count();
    if let Some(min) = min_length {
        if chars < min {
            return Err(ValidationError::invalid(format!(
                "ensure this value has at least {min} characters (it has {chars})"
            )));
        }
    }
    if let Some(max) = max_length {
        if chars > max {
            return Err(ValidationError::invalid(format!(
                "ensure this value has at most {max} characters (it has {chars})"
            )));
        }
    }
    Ok(())
}

/// Single-line text.
#[derive(Clone, Debug, Default)]
pub struct CharBlock {
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
}

impl CharBlock {
    pub(crate) fn descriptor(&self) -> Json {
        json!({
            "kind": "char",
            "max_length": self.max_length,
            "min_length": self.min_length,
        })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        text_from_json(raw, "char")
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        text_to_json(value, "char")
    }

    pub(crate) fn clean(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Text(s) => {
                clean_text_length(s, self.min_length, self.max_length)?;
                Ok(Value::Text(s.clone()))
            }
            other => Err(ValidationError::invalid(format!(
                "expected text, got {}",
                other.kind()
            ))),
        }
    }

    pub(crate) fn searchable(&self, value: &Value) -> Vec<String> {
        match value {
            Value::Text(s) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

/// Multi-line text. Same value model as [`CharBlock`]; the distinction
/// matters to the rendering collaborator.
#[derive(Clone, Debug, Default)]
pub struct TextBlock {
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
}

impl TextBlock {
    pub(crate) fn descriptor(&self) -> Json {
        json!({
            "kind": "text",
            "max_length": self.max_length,
            "min_length": self.min_length,
        })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        text_from_json(raw, "text")
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        text_to_json(value, "text")
    }

    pub(crate) fn clean(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Text(s) => {
                clean_text_length(s, self.min_length, self.max_length)?;
                Ok(Value::Text(s.clone()))
            }
            other => Err(ValidationError::invalid(format!(
                "expected text, got {}",
                other.kind()
            ))),
        }
    }

    pub(crate) fn searchable(&self, value: &Value) -> Vec<String> {
        match value {
            Value::Text(s) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

/// Checkbox-style boolean. A required boolean must be ticked to validate,
/// matching form checkbox semantics; pass `required(false)` on the
/// definition for conventional yes/no behavior.
#[derive(Clone, Debug, Default)]
pub struct BooleanBlock;

impl BooleanBlock {
    pub(crate) fn descriptor(&self) -> Json {
        json!({ "kind": "boolean" })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        match raw {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(ConfigError::ValueKind {
                expected: "boolean",
                found: json_kind(other),
            }),
        }
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        match value {
            Value::Null => Ok(Json::Null),
            Value::Bool(b) => Ok(json!(b)),
            other => Err(ConfigError::ValueKind {
                expected: "boolean",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn clean(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(ValidationError::invalid(format!(
                "expected a boolean, got {}",
                other.kind()
            ))),
        }
    }
}

/// Whole number with optional bounds.
#[derive(Clone, Debug, Default)]
pub struct IntegerBlock {
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
}

impl IntegerBlock {
    pub(crate) fn descriptor(&self) -> Json {
        json!({
            "kind": "integer",
            "min_value": self.min_value,
            "max_value": self.max_value,
        })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        match raw {
            Json::Null => Ok(Value::Null),
            Json::Number(n) => n.as_i64().map(Value::Int).ok_or(ConfigError::ValueKind {
                expected: "integer",
                found: "number",
            }),
            // numeric strings are coerced
            Json::String(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
                ConfigError::ValueKind {
                    expected: "integer",
                    found: "string",
                }
            }),
            other => Err(ConfigError::ValueKind {
                expected: "integer",
                found: json_kind(other),
            }),
        }
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        match value {
            Value::Null => Ok(Json::Null),
            Value::Int(n) => Ok(json!(n)),
            other => Err(ConfigError::ValueKind {
                expected: "integer",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn clean(&self, value: &Value) -> Result<Value, ValidationError> {
        let n = match value {
            Value::Int(n) => *n,
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::invalid("enter a whole number"))?,
            other => {
                return Err(ValidationError::invalid(format!(
                    "expected a whole number, got {}",
                    other.kind()
                )))
            }
        };
        if let Some(min) = self.min_value {
            if n < min {
                return Err(ValidationError::invalid(format!(
                    "ensure this value is greater than or equal to {min}"
                )));
            }
        }
        if let Some(max) = self.max_value {
            if n > max {
                return Err(ValidationError::invalid(format!(
                    "ensure this value is less than or equal to {max}"
                )));
            }
        }
        Ok(Value::Int(n))
    }
}

/// Floating-point number with optional bounds.
#[derive(Clone, Debug, Default)]
pub struct FloatBlock {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl FloatBlock {
    pub(crate) fn descriptor(&self) -> Json {
        json!({
            "kind": "float",
            "min_value": self.min_value,
            "max_value": self.max_value,
        })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        match raw {
            Json::Null => Ok(Value::Null),
            Json::Number(n) => n.as_f64().map(Value::Float).ok_or(ConfigError::ValueKind {
                expected: "float",
                found: "number",
            }),
            Json::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                ConfigError::ValueKind {
                    expected: "float",
                    found: "string",
                }
            }),
            other => Err(ConfigError::ValueKind {
                expected: "float",
                found: json_kind(other),
            }),
        }
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        match value {
            Value::Null => Ok(Json::Null),
            Value::Float(n) => Ok(json!(n)),
            Value::Int(n) => Ok(json!(*n as f64)),
            other => Err(ConfigError::ValueKind {
                expected: "float",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn clean(&self, value: &Value) -> Result<Value, ValidationError> {
        let n = match value {
            Value::Float(n) => *n,
            Value::Int(n) => *n as f64,
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::invalid("enter a number"))?,
            other => {
                return Err(ValidationError::invalid(format!(
                    "expected a number, got {}",
                    other.kind()
                )))
            }
        };
        if let Some(min) = self.min_value {
            if n < min {
                return Err(ValidationError::invalid(format!(
                    "ensure this value is greater than or equal to {min}"
                )));
            }
        }
        if let Some(max) = self.max_value {
            if n > max {
                return Err(ValidationError::invalid(format!(
                    "ensure this value is less than or equal to {max}"
                )));
            }
        }
        Ok(Value::Float(n))
    }
}

pub(crate) fn parse_date_text(s: &str) -> Option<Date> {
    Date::parse(s.trim(), DATE_FORMAT).ok()
}

pub(crate) fn parse_time_text(s: &str) -> Option<Time> {
    Time::parse(s.trim(), TIME_FORMAT).ok()
}

pub(crate) fn parse_datetime_text(s: &str) -> Option<PrimitiveDateTime> {
    let s = s.trim();
    PrimitiveDateTime::parse(s, DATETIME_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(s, DATETIME_SPACE_FORMAT))
        .ok()
}

/// Calendar date, serialized as `YYYY-MM-DD`.
///
/// JSON encoding turns date objects into strings and nothing on the way
/// back knows which strings were dates, so the conversion happens here.
/// Stored strings that no longer parse degrade to null rather than failing
/// the whole tree.
#[derive(Clone, Debug, Default)]
pub struct DateBlock;

impl DateBlock {
    pub(crate) fn descriptor(&self) -> Json {
        json!({ "kind": "date" })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        match raw {
            Json::Null => Ok(Value::Null),
            Json::String(s) => Ok(match parse_date_text(s) {
                Some(date) => Value::Date(date),
                None => {
                    tracing::debug!(raw = %s, "stored date does not parse; degrading to null");
                    Value::Null
                }
            }),
            other => Err(ConfigError::ValueKind {
                expected: "date",
                found: json_kind(other),
            }),
        }
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        match value {
            Value::Null => Ok(Json::Null),
            Value::Date(d) => d
                .format(DATE_FORMAT)
                .map(Json::String)
                .map_err(|err| ConfigError::Encode {
                    reason: err.to_string(),
                }),
            other => Err(ConfigError::ValueKind {
                expected: "date",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn clean(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Date(d) => Ok(Value::Date(*d)),
            Value::Text(s) => parse_date_text(s)
                .map(Value::Date)
                .ok_or_else(|| ValidationError::invalid("enter a valid date")),
            other => Err(ValidationError::invalid(format!(
                "expected a date, got {}",
                other.kind()
            ))),
        }
    }
}

/// Time of day, serialized as `HH:MM:SS`.
#[derive(Clone, Debug, Default)]
pub struct TimeBlock;

impl TimeBlock {
    pub(crate) fn descriptor(&self) -> Json {
        json!({ "kind": "time" })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        match raw {
            Json::Null => Ok(Value::Null),
            Json::String(s) => Ok(match parse_time_text(s) {
                Some(t) => Value::Time(t),
                None => {
                    tracing::debug!(raw = %s, "stored time does not parse; degrading to null");
                    Value::Null
                }
            }),
            other => Err(ConfigError::ValueKind {
                expected: "time",
                found: json_kind(other),
            }),
        }
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        match value {
            Value::Null => Ok(Json::Null),
            Value::Time(t) => t
                .format(TIME_FORMAT)
                .map(Json::String)
                .map_err(|err| ConfigError::Encode {
                    reason: err.to_string(),
                }),
            other => Err(ConfigError::ValueKind {
                expected: "time",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn clean(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Time(t) => Ok(Value::Time(*t)),
            Value::Text(s) => parse_time_text(s)
                .map(Value::Time)
                .ok_or_else(|| ValidationError::invalid("enter a valid time")),
            other => Err(ValidationError::invalid(format!(
                "expected a time, got {}",
                other.kind()
            ))),
        }
    }
}

/// Date and time of day, serialized as `YYYY-MM-DDTHH:MM:SS`. A space
/// separator is accepted on input.
#[derive(Clone, Debug, Default)]
pub struct DateTimeBlock;

impl DateTimeBlock {
    pub(crate) fn descriptor(&self) -> Json {
        json!({ "kind": "datetime" })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        match raw {
            Json::Null => Ok(Value::Null),
            Json::String(s) => Ok(match parse_datetime_text(s) {
                Some(dt) => Value::DateTime(dt),
                None => {
                    tracing::debug!(raw = %s, "stored datetime does not parse; degrading to null");
                    Value::Null
                }
            }),
            other => Err(ConfigError::ValueKind {
                expected: "datetime",
                found: json_kind(other),
            }),
        }
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        match value {
            Value::Null => Ok(Json::Null),
            Value::DateTime(dt) => dt
                .format(DATETIME_FORMAT)
                .map(Json::String)
                .map_err(|err| ConfigError::Encode {
                    reason: err.to_string(),
                }),
            other => Err(ConfigError::ValueKind {
                expected: "datetime",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn clean(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
            Value::Text(s) => parse_datetime_text(s)
                .map(Value::DateTime)
                .ok_or_else(|| ValidationError::invalid("enter a valid date and time")),
            other => Err(ValidationError::invalid(format!(
                "expected a datetime, got {}",
                other.kind()
            ))),
        }
    }
}

/// Choice from a static `(value, label)` list.
#[derive(Clone, Debug, Default)]
pub struct ChoiceBlock {
    pub choices: Vec<(String, String)>,
}

impl ChoiceBlock {
    pub fn new<V: Into<String>, L: Into<String>>(choices: Vec<(V, L)>) -> Self {
        Self {
            choices: choices
                .into_iter()
                .map(|(value, label)| (value.into(), label.into()))
                .collect(),
        }
    }

    fn label_for(&self, value: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, label)| label.as_str())
    }

    pub(crate) fn descriptor(&self) -> Json {
        json!({ "kind": "choice", "choices": self.choices })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        text_from_json(raw, "choice")
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        text_to_json(value, "choice")
    }

    pub(crate) fn clean(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Text(s) => {
                if self.label_for(s).is_none() {
                    return Err(ValidationError::invalid(format!(
                        "select a valid choice: `{s}` is not available"
                    )));
                }
                Ok(Value::Text(s.clone()))
            }
            other => Err(ValidationError::invalid(format!(
                "expected a choice value, got {}",
                other.kind()
            ))),
        }
    }

    /// The display label is what gets indexed, not the stored key.
    pub(crate) fn searchable(&self, value: &Value) -> Vec<String> {
        match value {
            Value::Text(s) => self
                .label_for(s)
                .map(|label| vec![label.to_string()])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

/// Reference to an externally-owned entity, stored as its identifier.
///
/// Deserialization resolves the identifier through the configured
/// [`EntityResolver`]; identifiers that no longer resolve degrade to null
/// instead of breaking the whole tree.
#[derive(Clone)]
pub struct ReferenceBlock {
    /// Entity kind name. Part of the reconstruction signature.
    pub target: String,
    resolver: Arc<dyn EntityResolver>,
}

impl ReferenceBlock {
    pub fn new(target: impl Into<String>, resolver: Arc<dyn EntityResolver>) -> Self {
        Self {
            target: target.into(),
            resolver,
        }
    }

    pub(crate) fn resolve(&self, id: &str) -> Option<Entity> {
        self.resolver.resolve(id)
    }

    pub(crate) fn descriptor(&self) -> Json {
        json!({ "kind": "reference", "target": self.target })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        match raw {
            Json::Null => Ok(Value::Null),
            Json::String(id) => Ok(match self.resolve(id) {
                Some(entity) => Value::Entity(entity),
                None => {
                    tracing::warn!(
                        target_kind = %self.target,
                        id = %id,
                        "entity reference no longer resolves; degrading to null"
                    );
                    Value::Null
                }
            }),
            other => Err(ConfigError::ValueKind {
                expected: "reference",
                found: json_kind(other),
            }),
        }
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        match value {
            Value::Null => Ok(Json::Null),
            Value::Entity(entity) => Ok(json!(entity.id)),
            other => Err(ConfigError::ValueKind {
                expected: "reference",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn clean(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Entity(entity) => Ok(Value::Entity(entity.clone())),
            Value::Text(id) => self.resolve(id).map(Value::Entity).ok_or_else(|| {
                ValidationError::invalid(format!("select a valid {}: `{id}` does not exist", self.target))
            }),
            other => Err(ValidationError::invalid(format!(
                "expected a {} reference, got {}",
                self.target,
                other.kind()
            ))),
        }
    }
}

impl fmt::Debug for ReferenceBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReferenceBlock({})", self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use time::macros::{date, datetime, time};

    struct MapResolver(HashMap<String, String>);

    impl EntityResolver for MapResolver {
        fn resolve(&self, id: &str) -> Option<Entity> {
            self.0.get(id).map(|title| Entity::new(id, title.clone()))
        }
    }

    fn authors() -> Arc<dyn EntityResolver> {
        let mut map = HashMap::new();
        map.insert("7".to_string(), "Ada Lovelace".to_string());
        Arc::new(MapResolver(map))
    }

    #[test]
    fn char_round_trips_and_validates_length() {
        let block = CharBlock {
            max_length: Some(5),
            min_length: Some(2),
        };
        let value = block.to_python(&json!("hello")).unwrap();
        assert_eq!(value, Value::text("hello"));
        assert_eq!(block.get_prep_value(&value).unwrap(), json!("hello"));

        assert!(block.clean(&Value::text("hello")).is_ok());
        let err = block.clean(&Value::text("h")).unwrap_err();
        assert!(err.to_string().contains("at least 2"));
        let err = block.clean(&Value::text("too long!")).unwrap_err();
        assert!(err.to_string().contains("at most 5"));
    }

    #[test]
    fn integer_coerces_numeric_strings() {
        let block = IntegerBlock {
            min_value: Some(0),
            max_value: Some(10),
        };
        assert_eq!(block.to_python(&json!(7)).unwrap(), Value::Int(7));
        assert_eq!(block.to_python(&json!("7")).unwrap(), Value::Int(7));
        assert_eq!(block.clean(&Value::text("3")).unwrap(), Value::Int(3));

        let err = block.clean(&Value::text("many")).unwrap_err();
        assert!(err.to_string().contains("whole number"));
        let err = block.clean(&Value::Int(11)).unwrap_err();
        assert!(err.to_string().contains("less than or equal to 10"));
    }

    #[test]
    fn date_round_trip_and_degradation() {
        let block = DateBlock;
        let value = block.to_python(&json!("2024-03-09")).unwrap();
        assert_eq!(value, Value::Date(date!(2024 - 03 - 09)));
        assert_eq!(block.get_prep_value(&value).unwrap(), json!("2024-03-09"));

        // unparseable stored content degrades, it does not raise
        assert_eq!(block.to_python(&json!("not a date")).unwrap(), Value::Null);

        let err = block.clean(&Value::text("not a date")).unwrap_err();
        assert!(err.to_string().contains("valid date"));
    }

    #[test]
    fn datetime_accepts_both_separators() {
        let block = DateTimeBlock;
        let expected = Value::DateTime(datetime!(2024-03-09 13:05:00));
        assert_eq!(
            block.to_python(&json!("2024-03-09T13:05:00")).unwrap(),
            expected
        );
        assert_eq!(
            block.to_python(&json!("2024-03-09 13:05:00")).unwrap(),
            expected
        );
        assert_eq!(
            block.get_prep_value(&expected).unwrap(),
            json!("2024-03-09T13:05:00")
        );
    }

    #[test]
    fn time_round_trip() {
        let block = TimeBlock;
        let value = block.to_python(&json!("13:05:09")).unwrap();
        assert_eq!(value, Value::Time(time!(13:05:09)));
        assert_eq!(block.get_prep_value(&value).unwrap(), json!("13:05:09"));
    }

    #[test]
    fn choice_validates_membership_and_indexes_labels() {
        let block = ChoiceBlock::new(vec![("am", "Morning"), ("pm", "Afternoon")]);
        assert_eq!(block.clean(&Value::text("am")).unwrap(), Value::text("am"));
        let err = block.clean(&Value::text("noon")).unwrap_err();
        assert!(err.to_string().contains("noon"));

        assert_eq!(block.searchable(&Value::text("pm")), vec!["Afternoon"]);
        assert!(block.searchable(&Value::text("noon")).is_empty());
    }

    #[test]
    fn reference_resolves_and_degrades_softly() {
        let block = ReferenceBlock::new("author", authors());
        let value = block.to_python(&json!("7")).unwrap();
        assert_eq!(value, Value::Entity(Entity::new("7", "Ada Lovelace")));
        assert_eq!(block.get_prep_value(&value).unwrap(), json!("7"));

        // broken reference: empty, not an error
        assert_eq!(block.to_python(&json!("404")).unwrap(), Value::Null);

        // clean re-resolves raw identifiers and rejects dead ones
        assert!(block.clean(&Value::text("7")).is_ok());
        let err = block.clean(&Value::text("404")).unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
