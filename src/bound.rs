//! Bound values: a definition paired with one concrete value.
//!
//! Many bound values may reference one shared definition. The pairing
//! exists for one-shot operations — serialize, extract searchable text,
//! build a render context — and for carrying validation errors next to the
//! value they belong to.

use std::sync::Arc;

use serde_json::{Map as JsonMap, Value as Json};

use crate::block::BlockDef;
use crate::error::{ConfigError, ValidationError};
use crate::value::Value;

#[derive(Clone, Debug)]
pub struct BoundValue {
    block: Arc<BlockDef>,
    value: Value,
    errors: Option<ValidationError>,
    /// Path-like key disambiguating this node's form inputs when several
    /// nodes render at once. Only the form collaborator cares.
    prefix: Option<String>,
}

impl BoundValue {
    pub fn new(block: Arc<BlockDef>, value: Value) -> Self {
        Self {
            block,
            value,
            errors: None,
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_errors(mut self, errors: ValidationError) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn block(&self) -> &Arc<BlockDef> {
        &self.block
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn errors(&self) -> Option<&ValidationError> {
        self.errors.as_ref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn get_prep_value(&self) -> Result<Json, ConfigError> {
        self.block.get_prep_value(&self.value)
    }

    pub fn to_stored_text(&self) -> Result<String, ConfigError> {
        self.block.to_stored_text(&self.value)
    }

    pub fn get_searchable_content(&self) -> Vec<String> {
        self.block.get_searchable_content(&self.value)
    }

    pub fn get_context(
        &self,
        parent_context: Option<&JsonMap<String, Json>>,
    ) -> JsonMap<String, Json> {
        self.block.get_context(&self.value, parent_context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::CharBlock;

    #[test]
    fn bound_value_delegates_to_its_definition() {
        let block = Arc::new(BlockDef::new(CharBlock::default()));
        let bound = block
            .bind(Value::text("hello"))
            .with_prefix("body-0-value");
        assert_eq!(bound.prefix(), Some("body-0-value"));
        assert_eq!(bound.get_prep_value().unwrap(), serde_json::json!("hello"));
        assert_eq!(bound.get_searchable_content(), vec!["hello"]);
        assert!(bound.errors().is_none());
    }

    #[test]
    fn errors_ride_alongside_the_value() {
        let block = Arc::new(BlockDef::new(CharBlock::default()));
        let bound = block
            .bind(Value::text(""))
            .with_errors(ValidationError::Required);
        assert_eq!(bound.errors(), Some(&ValidationError::Required));
    }
}
