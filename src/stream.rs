//! Stream container: an ordered, freely-typed sequence of (variant, value)
//! pairs — the root composition kind.
//!
//! The declared variants form the palette of block types permitted at any
//! position; the same variant may appear at many positions. Legacy stored
//! content that is not valid JSON decomposes to an empty sequence while
//! the original text rides along for a verbatim round trip.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Value as Json};

use crate::block::BlockDef;
use crate::check::{self, Diagnostic};
use crate::error::{BlockError, ConfigError, ValidationError};
use crate::value::{json_kind, StreamValue, Value};

#[derive(Clone, Debug)]
pub struct StreamBlock {
    variants: IndexMap<String, Arc<BlockDef>>,
    /// Colliding declared names. The first declaration wins; the collision
    /// is surfaced by `check`.
    duplicate_names: Vec<String>,
}

impl StreamBlock {
    /// Build from the ordered variant palette, binding each variant's name.
    pub fn new(variants: Vec<(String, BlockDef)>) -> Result<Self, ConfigError> {
        let mut map = IndexMap::new();
        let mut duplicate_names = Vec::new();
        for (name, mut block) in variants {
            if map.contains_key(&name) {
                duplicate_names.push(name);
                continue;
            }
            block.bind_name(&name)?;
            map.insert(name, Arc::new(block));
        }
        Ok(Self {
            variants: map,
            duplicate_names,
        })
    }

    pub fn variants(&self) -> impl Iterator<Item = (&str, &Arc<BlockDef>)> {
        self.variants
            .iter()
            .map(|(name, block)| (name.as_str(), block))
    }

    pub fn variant(&self, name: &str) -> Option<&Arc<BlockDef>> {
        self.variants.get(name)
    }

    pub(crate) fn descriptor(&self) -> Json {
        let variants: Vec<Json> = self
            .variants
            .iter()
            .map(|(name, block)| json!([name, block.descriptor()]))
            .collect();
        json!({ "kind": "stream", "variants": variants })
    }

    /// Three input shapes normalize identically: JSON `null` (empty), a
    /// JSON string holding the stored text (parsed, with a raw-text
    /// fallback when it is not JSON), and a bare array of
    /// `[variant, value]` pairs.
    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        match raw {
            Json::Null => Ok(Value::Stream(StreamValue::default())),
            Json::String(stored) => match serde_json::from_str::<Json>(stored) {
                Ok(Json::Null) => Ok(Value::Stream(StreamValue::default())),
                Ok(inner) => self.decompose(&inner),
                Err(_) => {
                    tracing::warn!(
                        len = stored.len(),
                        "stored stream content is not valid JSON; keeping it as raw text"
                    );
                    Ok(Value::Stream(StreamValue::legacy(stored.clone())))
                }
            },
            Json::Array(_) => self.decompose(raw),
            other => Err(ConfigError::ValueKind {
                expected: "stream",
                found: json_kind(other),
            }),
        }
    }

    fn decompose(&self, raw: &Json) -> Result<Value, ConfigError> {
        let Json::Array(pairs) = raw else {
            return Err(ConfigError::ValueKind {
                expected: "stream",
                found: json_kind(raw),
            });
        };
        let mut out = StreamValue::default();
        for pair in pairs {
            let Some((name, child_raw)) = as_pair(pair) else {
                tracing::debug!("skipping malformed stream pair");
                continue;
            };
            match self.variants.get(name) {
                Some(child) => out.push(name, child.to_python(child_raw)?),
                None => {
                    // content written under a block type that is no longer
                    // declared; dropping it keeps the rest readable
                    tracing::warn!(block_type = %name, "skipping stream pair of undeclared type");
                }
            }
        }
        Ok(Value::Stream(out))
    }

    /// An empty sequence carrying raw text serializes back to that text
    /// verbatim; everything else serializes to the array of
    /// `[variant, value]` pairs in sequence order.
    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        let stream = as_stream(value)?;
        if stream.is_empty() {
            if let Some(raw_text) = stream.raw_text() {
                return Ok(Json::String(raw_text.to_string()));
            }
        }
        let mut out = Vec::with_capacity(stream.len());
        for item in stream.items() {
            let child = self.require_variant(&item.block_type)?;
            out.push(json!([item.block_type, child.get_prep_value(&item.value)?]));
        }
        Ok(Json::Array(out))
    }

    /// Clean each pair through its variant, collecting one error-or-null
    /// per position. A pair referencing an undeclared variant is a schema
    /// fault and propagates immediately.
    pub(crate) fn clean(&self, value: &Value) -> Result<Value, BlockError> {
        let stream = as_stream(value)?;
        let mut cleaned = StreamValue::default();
        let mut errors: Vec<Option<ValidationError>> = Vec::with_capacity(stream.len());
        for item in stream.items() {
            let child = self.require_variant(&item.block_type)?;
            match child.clean(&item.value) {
                Ok(v) => {
                    cleaned.push(item.block_type.clone(), v);
                    errors.push(None);
                }
                Err(BlockError::Validation(err)) => errors.push(Some(err)),
                Err(BlockError::Config(err)) => return Err(err.into()),
            }
        }
        if errors.iter().any(Option::is_some) {
            return Err(ValidationError::Stream { errors }.into());
        }
        Ok(Value::Stream(cleaned))
    }

    pub(crate) fn searchable(&self, value: &Value) -> Vec<String> {
        let Value::Stream(stream) = value else {
            return Vec::new();
        };
        stream
            .items()
            .iter()
            .filter_map(|item| {
                self.variants
                    .get(&item.block_type)
                    .map(|child| child.get_searchable_content(&item.value))
            })
            .flatten()
            .collect()
    }

    pub(crate) fn check(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        if self.variants.is_empty() && self.duplicate_names.is_empty() {
            out.push(Diagnostic::warning(
                "empty_palette",
                "stream declares no block types, so it offers nothing to add",
            ));
        }
        for name in &self.duplicate_names {
            out.push(Diagnostic::error(
                "duplicate_child_name",
                format!("block type `{name}` is declared more than once"),
            ));
        }
        for (name, child) in &self.variants {
            out.extend(check::check_name(name).into_iter().map(|d| d.located(name)));
            out.extend(check::prefix_path(child.check(), name));
        }
        out
    }

    fn require_variant(&self, name: &str) -> Result<&Arc<BlockDef>, ConfigError> {
        self.variants
            .get(name)
            .ok_or_else(|| ConfigError::UnknownVariant {
                variant: name.to_string(),
            })
    }
}

fn as_stream(value: &Value) -> Result<&StreamValue, ConfigError> {
    match value {
        Value::Stream(stream) => Ok(stream),
        other => Err(ConfigError::ValueKind {
            expected: "stream",
            found: other.kind(),
        }),
    }
}

fn as_pair(pair: &Json) -> Option<(&str, &Json)> {
    let Json::Array(parts) = pair else {
        return None;
    };
    match parts.as_slice() {
        [Json::String(name), value] => Some((name.as_str(), value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{CharBlock, IntegerBlock, TextBlock};
    use crate::value::StreamChild;

    fn page() -> StreamBlock {
        StreamBlock::new(vec![
            (
                "heading".to_string(),
                BlockDef::new(CharBlock {
                    min_length: Some(1),
                    ..CharBlock::default()
                }),
            ),
            ("paragraph".to_string(), BlockDef::new(TextBlock::default())),
            ("rating".to_string(), BlockDef::new(IntegerBlock::default())),
        ])
        .expect("page schema")
    }

    #[test]
    fn null_normalizes_to_empty() {
        let block = page();
        assert_eq!(
            block.to_python(&Json::Null).unwrap(),
            Value::Stream(StreamValue::default())
        );
        // a stored literal "null" behaves identically
        assert_eq!(
            block.to_python(&json!("null")).unwrap(),
            Value::Stream(StreamValue::default())
        );
    }

    #[test]
    fn stored_text_and_bare_pairs_normalize_identically() {
        let block = page();
        let pairs = json!([["heading", "Hi"], ["rating", 5]]);
        let from_pairs = block.to_python(&pairs).unwrap();
        let from_text = block.to_python(&json!(pairs.to_string())).unwrap();
        assert_eq!(from_pairs, from_text);

        let Value::Stream(stream) = from_pairs else { panic!("expected stream") };
        assert_eq!(stream.items().len(), 2);
        assert_eq!(stream.items()[0].block_type, "heading");
        assert_eq!(stream.items()[1].value, Value::Int(5));
    }

    #[test]
    fn legacy_text_round_trips_verbatim() {
        let block = page();
        let value = block.to_python(&json!("not json at all")).unwrap();
        let Value::Stream(stream) = &value else { panic!("expected stream") };
        assert!(stream.is_empty());
        assert_eq!(stream.raw_text(), Some("not json at all"));
        assert_eq!(
            block.get_prep_value(&value).unwrap(),
            json!("not json at all")
        );
    }

    #[test]
    fn undeclared_types_are_dropped_on_deserialize() {
        let block = page();
        let value = block
            .to_python(&json!([["heading", "Hi"], ["retired_embed", "x"]]))
            .unwrap();
        let Value::Stream(stream) = value else { panic!("expected stream") };
        assert_eq!(stream.len(), 1);
    }

    #[test]
    fn clean_rejects_undeclared_types_as_config_error() {
        let block = page();
        let mut stream = StreamValue::default();
        stream.push("retired_embed", Value::text("x"));
        let err = block.clean(&Value::Stream(stream)).unwrap_err();
        assert_eq!(
            err,
            BlockError::Config(ConfigError::UnknownVariant {
                variant: "retired_embed".into()
            })
        );
    }

    #[test]
    fn clean_collects_positional_errors() {
        let block = page();
        let value = Value::Stream(StreamValue::new(vec![
            StreamChild::new("heading", Value::text("ok")),
            StreamChild::new("heading", Value::text("")),
            StreamChild::new("rating", Value::Int(4)),
        ]));
        let err = block.clean(&value).unwrap_err();
        let BlockError::Validation(ValidationError::Stream { errors }) = err else {
            panic!("expected positional stream error");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors[0].is_none());
        assert!(errors[1].is_some());
        assert!(errors[2].is_none());
    }

    #[test]
    fn duplicate_types_repeat_freely_in_values() {
        let block = page();
        let value = block
            .to_python(&json!([["heading", "One"], ["heading", "Two"]]))
            .unwrap();
        let prepped = block.get_prep_value(&value).unwrap();
        assert_eq!(prepped, json!([["heading", "One"], ["heading", "Two"]]));
    }

    #[test]
    fn empty_palette_is_a_warning_not_an_error() {
        let block = StreamBlock::new(Vec::new()).unwrap();
        let diags = block.check();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "empty_palette");
        assert_eq!(diags[0].severity, crate::check::Severity::Warning);
    }

    #[test]
    fn colliding_variant_names_are_an_error() {
        let block = StreamBlock::new(vec![
            ("heading".to_string(), BlockDef::new(CharBlock::default())),
            ("heading".to_string(), BlockDef::new(TextBlock::default())),
        ])
        .unwrap();
        let diags = block.check();
        assert!(diags
            .iter()
            .any(|d| d.code == "duplicate_child_name"
                && d.severity == crate::check::Severity::Error));
    }
}
