//! List container: one homogeneous child definition, repeated, with
//! per-position edit reconciliation.

use std::sync::Arc;

use serde_json::{json, Value as Json};

use crate::block::BlockDef;
use crate::check::Diagnostic;
use crate::error::{BlockError, ConfigError, ValidationError};
use crate::value::{json_kind, Value};

#[derive(Clone, Debug)]
pub struct ListBlock {
    child: Arc<BlockDef>,
}

impl ListBlock {
    /// The child stays unnamed: list positions are addressed by index, not
    /// by name.
    pub fn new(child: BlockDef) -> Self {
        Self {
            child: Arc::new(child),
        }
    }

    pub fn child(&self) -> &Arc<BlockDef> {
        &self.child
    }

    pub(crate) fn descriptor(&self) -> Json {
        json!({ "kind": "list", "child": self.child.descriptor() })
    }

    pub(crate) fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        match raw {
            Json::Null => Ok(Value::List(Vec::new())),
            Json::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.child.to_python(item)?);
                }
                Ok(Value::List(out))
            }
            other => Err(ConfigError::ValueKind {
                expected: "list",
                found: json_kind(other),
            }),
        }
    }

    pub(crate) fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        let items = as_list(value)?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(self.child.get_prep_value(item)?);
        }
        Ok(Json::Array(out))
    }

    /// Clean every element, collecting one error-or-null per position so a
    /// caller can re-attribute failures to specific list positions.
    pub(crate) fn clean(&self, value: &Value) -> Result<Value, BlockError> {
        let items = as_list(value)?;
        let mut cleaned = Vec::with_capacity(items.len());
        let mut errors: Vec<Option<ValidationError>> = Vec::with_capacity(items.len());
        for item in items {
            match self.child.clean(item) {
                Ok(v) => {
                    cleaned.push(v);
                    errors.push(None);
                }
                Err(BlockError::Validation(err)) => errors.push(Some(err)),
                Err(BlockError::Config(err)) => return Err(err.into()),
            }
        }
        if errors.iter().any(Option::is_some) {
            return Err(ValidationError::List { errors }.into());
        }
        Ok(Value::List(cleaned))
    }

    /// Unconfigured default: one element holding the child's default.
    pub(crate) fn derived_default(&self) -> Result<Value, ConfigError> {
        Ok(Value::List(vec![self.child.get_default()?]))
    }

    pub(crate) fn searchable(&self, value: &Value) -> Vec<String> {
        let Value::List(items) = value else {
            return Vec::new();
        };
        items
            .iter()
            .flat_map(|item| self.child.get_searchable_content(item))
            .collect()
    }

    pub(crate) fn check(&self) -> Vec<Diagnostic> {
        self.child.check()
    }
}

fn as_list(value: &Value) -> Result<&[Value], ConfigError> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(ConfigError::ValueKind {
            expected: "list",
            found: other.kind(),
        }),
    }
}

/// One previous list position as submitted by an edit: where the user
/// moved it, whether they deleted it, and its (possibly edited) value.
#[derive(Clone, Debug, PartialEq)]
pub struct ListEditEntry {
    pub order: i64,
    pub deleted: bool,
    pub value: Value,
}

impl ListEditEntry {
    pub fn new(order: i64, deleted: bool, value: Value) -> Self {
        Self {
            order,
            deleted,
            value,
        }
    }
}

/// Reconcile an edited list: drop entries flagged deleted, then sort the
/// survivors by their submitted order index.
///
/// The sort is stable; ties are a caller error and keep their relative
/// submission order rather than crashing.
pub fn reconcile(entries: Vec<ListEditEntry>) -> Vec<Value> {
    let mut kept: Vec<ListEditEntry> = entries.into_iter().filter(|e| !e.deleted).collect();
    kept.sort_by_key(|e| e.order);
    kept.into_iter().map(|e| e.value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::CharBlock;

    fn names() -> ListBlock {
        ListBlock::new(BlockDef::new(CharBlock {
            min_length: Some(1),
            ..CharBlock::default()
        }))
    }

    #[test]
    fn to_python_preserves_order() {
        let block = names();
        let value = block.to_python(&json!(["hi", "ho"])).unwrap();
        assert_eq!(
            value,
            Value::List(vec![Value::text("hi"), Value::text("ho")])
        );
        assert_eq!(block.get_prep_value(&value).unwrap(), json!(["hi", "ho"]));
    }

    #[test]
    fn clean_reports_positional_errors_with_nulls_for_passes() {
        let block = names();
        let value = Value::List(vec![
            Value::text("ok"),
            Value::text(""),
            Value::text("fine"),
        ]);
        let err = block.clean(&value).unwrap_err();
        let BlockError::Validation(ValidationError::List { errors }) = err else {
            panic!("expected positional list error");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors[0].is_none());
        assert!(errors[1].is_some());
        assert!(errors[2].is_none());
    }

    #[test]
    fn derived_default_is_one_default_child() {
        let block = names();
        assert_eq!(
            block.derived_default().unwrap(),
            Value::List(vec![Value::text("")])
        );
    }

    #[test]
    fn reconcile_drops_deleted_and_sorts_by_order() {
        let result = reconcile(vec![
            ListEditEntry::new(2, false, Value::text("A")),
            ListEditEntry::new(0, false, Value::text("B")),
            ListEditEntry::new(1, true, Value::text("C")),
        ]);
        assert_eq!(result, vec![Value::text("B"), Value::text("A")]);
    }

    #[test]
    fn reconcile_keeps_submission_order_on_ties() {
        let result = reconcile(vec![
            ListEditEntry::new(0, false, Value::text("first")),
            ListEditEntry::new(0, false, Value::text("second")),
        ]);
        assert_eq!(result, vec![Value::text("first"), Value::text("second")]);
    }
}
