//! Structured form-data reconciliation.
//!
//! The form collaborator submits flat key → string data. Each container
//! defines the prefix conventions its children use:
//!
//! - struct: `prefix-childname`
//! - list: `prefix-count`, then per previous position `prefix-N-value`,
//!   `prefix-N-order`, `prefix-N-deleted`
//! - stream: the list keys plus a `prefix-N-type` discriminator
//!
//! Deleted positions are dropped and survivors are stable-sorted by their
//! submitted order index. Leaf strings that fail coercion survive as text
//! so `clean` can reject them with a proper validation error instead of
//! the form layer swallowing them.

use std::collections::HashMap;

use crate::block::{BlockDef, BlockKind};
use crate::error::ConfigError;
use crate::field::{parse_date_text, parse_datetime_text, parse_time_text};
use crate::list::{reconcile, ListEditEntry};
use crate::value::{StreamValue, StructValue, Value};

/// Flat form submission: input name → submitted string.
pub type FormData = HashMap<String, String>;

impl BlockDef {
    /// Whether the submission contains no trace of this block at all, so
    /// the hosting field should fall back to its default.
    pub fn value_omitted_from_form(&self, data: &FormData, prefix: &str) -> bool {
        match self.kind() {
            BlockKind::List(_) | BlockKind::Stream(_) => {
                !data.contains_key(&format!("{prefix}-count"))
            }
            BlockKind::Struct(b) => b
                .children()
                .all(|(name, child)| child.value_omitted_from_form(data, &format!("{prefix}-{name}"))),
            _ => !data.contains_key(prefix),
        }
    }

    /// Rebuild a native value from submitted form data, the per-container
    /// inverse of rendering. The result is a candidate for `clean`, not a
    /// validated value.
    pub fn value_from_form(&self, data: &FormData, prefix: &str) -> Result<Value, ConfigError> {
        match self.kind() {
            BlockKind::Struct(b) => {
                let mut out = StructValue::new();
                for (name, child) in b.children() {
                    let value = child.value_from_form(data, &format!("{prefix}-{name}"))?;
                    out.insert(name, value);
                }
                Ok(Value::Struct(out))
            }
            BlockKind::List(b) => {
                let count = submitted_count(data, prefix)?;
                let mut entries = Vec::with_capacity(count);
                for i in 0..count {
                    if submitted_deleted(data, prefix, i) {
                        continue;
                    }
                    let order = submitted_order(data, prefix, i)?;
                    let value = b
                        .child()
                        .value_from_form(data, &format!("{prefix}-{i}-value"))?;
                    entries.push(ListEditEntry::new(order, false, value));
                }
                Ok(Value::List(reconcile(entries)))
            }
            BlockKind::Stream(b) => {
                let count = submitted_count(data, prefix)?;
                let mut entries: Vec<(i64, String, Value)> = Vec::with_capacity(count);
                for i in 0..count {
                    if submitted_deleted(data, prefix, i) {
                        continue;
                    }
                    let type_key = format!("{prefix}-{i}-type");
                    let block_type = data
                        .get(&type_key)
                        .ok_or(ConfigError::MissingFormKey { key: type_key })?;
                    let child =
                        b.variant(block_type)
                            .ok_or_else(|| ConfigError::UnknownVariant {
                                variant: block_type.clone(),
                            })?;
                    let order = submitted_order(data, prefix, i)?;
                    let value = child.value_from_form(data, &format!("{prefix}-{i}-value"))?;
                    entries.push((order, block_type.clone(), value));
                }
                entries.sort_by_key(|(order, _, _)| *order);
                let mut out = StreamValue::default();
                for (_, block_type, value) in entries {
                    out.push(block_type, value);
                }
                Ok(Value::Stream(out))
            }
            kind => Ok(leaf_value_from_form(kind, data, prefix)),
        }
    }
}

fn submitted_count(data: &FormData, prefix: &str) -> Result<usize, ConfigError> {
    let key = format!("{prefix}-count");
    let raw = data
        .get(&key)
        .ok_or_else(|| ConfigError::MissingFormKey { key: key.clone() })?;
    raw.trim()
        .parse::<usize>()
        .map_err(|err| ConfigError::FormValue {
            key,
            reason: err.to_string(),
        })
}

fn submitted_order(data: &FormData, prefix: &str, index: usize) -> Result<i64, ConfigError> {
    let key = format!("{prefix}-{index}-order");
    let raw = data
        .get(&key)
        .ok_or_else(|| ConfigError::MissingFormKey { key: key.clone() })?;
    raw.trim()
        .parse::<i64>()
        .map_err(|err| ConfigError::FormValue {
            key,
            reason: err.to_string(),
        })
}

fn submitted_deleted(data: &FormData, prefix: &str, index: usize) -> bool {
    data.get(&format!("{prefix}-{index}-deleted"))
        .is_some_and(|flag| !flag.is_empty())
}

/// Checkbox semantics: an absent key is false, as are the conventional
/// falsy strings browsers never send but tests do.
fn checkbox_truthy(raw: &str) -> bool {
    !matches!(raw, "" | "0" | "false" | "False")
}

fn leaf_value_from_form(kind: &BlockKind, data: &FormData, prefix: &str) -> Value {
    let raw = data.get(prefix);
    match kind {
        BlockKind::Boolean(_) => Value::Bool(raw.is_some_and(|s| checkbox_truthy(s))),
        BlockKind::Char(_) | BlockKind::Text(_) => match raw {
            Some(s) => Value::Text(s.clone()),
            None => Value::Null,
        },
        _ => {
            let Some(raw) = raw.map(String::as_str).filter(|s| !s.is_empty()) else {
                return Value::Null;
            };
            match kind {
                BlockKind::Integer(_) => raw
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .unwrap_or_else(|_| Value::text(raw)),
                BlockKind::Float(_) => raw
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .unwrap_or_else(|_| Value::text(raw)),
                BlockKind::Date(_) => parse_date_text(raw)
                    .map(Value::Date)
                    .unwrap_or_else(|| Value::text(raw)),
                BlockKind::Time(_) => parse_time_text(raw)
                    .map(Value::Time)
                    .unwrap_or_else(|| Value::text(raw)),
                BlockKind::DateTime(_) => parse_datetime_text(raw)
                    .map(Value::DateTime)
                    .unwrap_or_else(|| Value::text(raw)),
                BlockKind::Choice(_) => Value::text(raw),
                BlockKind::Reference(b) => b
                    .resolve(raw)
                    .map(Value::Entity)
                    .unwrap_or_else(|| Value::text(raw)),
                _ => Value::text(raw),
            }
        }
    }
}
