//! Struct container: a fixed, named, ordered set of heterogeneous
//! children whose value is a mapping from child name to child value.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Value as Json};

use crate::block::BlockDef;
use crate::check::{self, Diagnostic};
use crate::error::{BlockError, ConfigError, ValidationError};
use crate::value::{json_kind, StructValue, Value};

#[derive(Clone, Debug)]
pub struct StructBlock {
    children: IndexMap<String, Arc<BlockDef>>,
    /// Names declared more than once. The first declaration wins; the
    /// collision is surfaced by `check`.
    duplicate_names: Vec<String>,
}

impl StructBlock {
    /// Build from an ordered child list, binding each child's name.
    ///
    /// Fails if a supplied child already carries a bound name: definitions
    /// bind exactly once.
    pub fn new(children: Vec<(String, BlockDef)>) -> Result<Self, ConfigError> {
        let mut map = IndexMap::new();
        let mut duplicate_names = Vec::new();
        for (name, mut block) in children {
            if map.contains_key(&name) {
                duplicate_names.push(name);
                continue;
            }
            block.bind_name(&name)?;
            map.insert(name, Arc::new(block));
        }
        Ok(Self {
            children: map,
            duplicate_names,
        })
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Arc<BlockDef>)> {
        self.children
            .iter()
            .map(|(name, block)| (name.as_str(), block))
    }

    pub fn child(&self, name: &str) -> Option<&Arc<BlockDef>> {
        self.children.get(name)
    }

    pub(crate) fn descriptor(&self) -> Json {
        let children: Vec<Json> = self
            .children
            .iter()
            .map(|(name, block)| json!([name, block.descriptor()]))
            .collect();
        json!({ "kind": "struct", "children": children })
    }

    /// Declared children present in the mapping deserialize through their
    /// own `to_python`; absent children take their default. Unknown keys
    /// are ignored, which is what lets stored content survive schema
    /// evolution.
    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        let map = match raw {
            Json::Object(map) => Some(map),
            Json::Null => None,
            other => {
                return Err(ConfigError::ValueKind {
                    expected: "struct",
                    found: json_kind(other),
                })
            }
        };
        let mut out = StructValue::new();
        for (name, child) in &self.children {
            let value = match map.and_then(|m| m.get(name)) {
                Some(raw_child) => child.to_python(raw_child)?,
                None => child.get_default()?,
            };
            out.insert(name.clone(), value);
        }
        Ok(Value::Struct(out))
    }

    /// Serialize every declared child, in declared order. A value missing
    /// a declared key is a schema-level fault, not a user error.
    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        let sv = as_struct(value)?;
        let mut out = serde_json::Map::new();
        for (name, child) in &self.children {
            let child_value = sv
                .get(name)
                .ok_or_else(|| ConfigError::MissingKey { key: name.clone() })?;
            out.insert(name.clone(), child.get_prep_value(child_value)?);
        }
        Ok(Json::Object(out))
    }

    /// Clean every child and collect all failures into one composite
    /// error keyed by child name. Never stops at the first failure.
    pub(crate) fn clean(&self, value: &Value) -> Result<Value, BlockError> {
        let sv = as_struct(value)?;
        let mut cleaned = StructValue::new();
        let mut errors: Vec<(String, ValidationError)> = Vec::new();
        for (name, child) in &self.children {
            let child_value = sv.get(name).cloned().unwrap_or(Value::Null);
            match child.clean(&child_value) {
                Ok(v) => cleaned.insert(name.clone(), v),
                Err(BlockError::Validation(err)) => errors.push((name.clone(), err)),
                Err(BlockError::Config(err)) => return Err(err.into()),
            }
        }
        if !errors.is_empty() {
            return Err(ValidationError::Struct { errors }.into());
        }
        Ok(Value::Struct(cleaned))
    }

    pub(crate) fn derived_default(&self) -> Result<Value, ConfigError> {
        let mut out = StructValue::new();
        for (name, child) in &self.children {
            out.insert(name.clone(), child.get_default()?);
        }
        Ok(Value::Struct(out))
    }

    pub(crate) fn searchable(&self, value: &Value) -> Vec<String> {
        let Value::Struct(sv) = value else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (name, child) in &self.children {
            if let Some(child_value) = sv.get(name) {
                out.extend(child.get_searchable_content(child_value));
            }
        }
        out
    }

    pub(crate) fn check(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for name in &self.duplicate_names {
            out.push(Diagnostic::error(
                "duplicate_child_name",
                format!("child name `{name}` is declared more than once"),
            ));
        }
        for (name, child) in &self.children {
            out.extend(check::check_name(name).into_iter().map(|d| d.located(name)));
            out.extend(check::prefix_path(child.check(), name));
        }
        out
    }
}

fn as_struct(value: &Value) -> Result<&StructValue, ConfigError> {
    match value {
        Value::Struct(sv) => Ok(sv),
        other => Err(ConfigError::ValueKind {
            expected: "struct",
            found: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{CharBlock, IntegerBlock};

    fn person() -> StructBlock {
        StructBlock::new(vec![
            (
                "name".to_string(),
                BlockDef::new(CharBlock {
                    min_length: Some(1),
                    ..CharBlock::default()
                }),
            ),
            (
                "age".to_string(),
                BlockDef::new(IntegerBlock {
                    min_value: Some(0),
                    ..IntegerBlock::default()
                }),
            ),
        ])
        .expect("person schema")
    }

    #[test]
    fn to_python_fills_missing_children_with_defaults() {
        let block = person();
        let value = block.to_python(&json!({ "name": "Ada" })).unwrap();
        let Value::Struct(sv) = value else { panic!("expected struct") };
        assert_eq!(sv.get("name"), Some(&Value::text("Ada")));
        assert_eq!(sv.get("age"), Some(&Value::Null));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let block = person();
        let with_extra = block
            .to_python(&json!({ "name": "Ada", "age": 36, "obsolete": true }))
            .unwrap();
        let without = block.to_python(&json!({ "name": "Ada", "age": 36 })).unwrap();
        assert_eq!(with_extra, without);
    }

    #[test]
    fn prep_value_requires_every_declared_key() {
        let block = person();
        let mut sv = StructValue::new();
        sv.insert("name", Value::text("Ada"));
        let err = block.get_prep_value(&Value::Struct(sv)).unwrap_err();
        assert_eq!(err, ConfigError::MissingKey { key: "age".into() });
    }

    #[test]
    fn prep_value_orders_keys_by_declaration() {
        let block = person();
        let value = block.to_python(&json!({ "age": 36, "name": "Ada" })).unwrap();
        let prepped = block.get_prep_value(&value).unwrap();
        let keys: Vec<_> = prepped.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "age"]);
    }

    #[test]
    fn clean_collects_every_child_failure() {
        let block = person();
        let mut sv = StructValue::new();
        sv.insert("name", Value::text(""));
        sv.insert("age", Value::Int(-3));
        let err = block.clean(&Value::Struct(sv)).unwrap_err();
        let BlockError::Validation(ValidationError::Struct { errors }) = err else {
            panic!("expected composite struct error");
        };
        let names: Vec<_> = errors.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["name", "age"]);
    }

    #[test]
    fn duplicate_child_names_surface_in_check() {
        let block = StructBlock::new(vec![
            ("title".to_string(), BlockDef::new(CharBlock::default())),
            ("title".to_string(), BlockDef::new(CharBlock::default())),
        ])
        .unwrap();
        let diags = block.check();
        assert!(diags.iter().any(|d| d.code == "duplicate_child_name"));
    }

    #[test]
    fn check_recurses_with_paths() {
        let inner = StructBlock::new(vec![(
            "bad name".to_string(),
            BlockDef::new(CharBlock::default()),
        )])
        .unwrap();
        let outer = StructBlock::new(vec![(
            "inner".to_string(),
            BlockDef::new(inner),
        )])
        .unwrap();
        let diags = outer.check();
        let space = diags
            .iter()
            .find(|d| d.code == "name_has_space")
            .expect("nested diagnostic");
        assert_eq!(space.path, "inner.bad name");
    }
}
