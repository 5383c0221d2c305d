//! Error taxonomy for the block engine.
//!
//! `ConfigError` is a structural or schema problem: always a programmer
//! error, never user-triggered, and it propagates immediately.
//! `ValidationError` is the sole recoverable error. It is returned only by
//! `clean` and carries structured per-node detail so a composite failure
//! can be attributed to the originating leaf through any number of
//! container levels.

use thiserror::Error;

/// Structural or schema problem detected at definition time or at
/// dispatch time.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("block name `{name}` is already bound")]
    RebindForbidden { name: String },

    #[error("stream has no declared block type `{variant}`")]
    UnknownVariant { variant: String },

    #[error("struct value is missing declared key `{key}`")]
    MissingKey { key: String },

    #[error("{found} value is not usable as {expected}")]
    ValueKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("configured default for `{name}` is not a valid {expected} value")]
    BadDefault {
        name: String,
        expected: &'static str,
    },

    #[error("form data is missing key `{key}`")]
    MissingFormKey { key: String },

    #[error("form value `{key}` is malformed: {reason}")]
    FormValue { key: String, reason: String },

    #[error("stored value could not be encoded as JSON: {reason}")]
    Encode { reason: String },
}

/// Value failure from `clean`, attributable to the originating node.
///
/// Composite containers never raise on the first child failure: they
/// evaluate all children and raise once with the full set, so a caller can
/// display every error simultaneously.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("this block is required")]
    Required,

    #[error("{0}")]
    Invalid(String),

    /// Per-child failures keyed by child name, in declaration order.
    #[error("validation failed for {} struct child block(s)", .errors.len())]
    Struct { errors: Vec<(String, ValidationError)> },

    /// One entry per list position; `None` marks a position that passed.
    #[error("validation failed for {} of {} list item(s)", .errors.iter().flatten().count(), .errors.len())]
    List { errors: Vec<Option<ValidationError>> },

    /// One entry per stream position; `None` marks a position that passed.
    #[error("validation failed for {} of {} stream block(s)", .errors.iter().flatten().count(), .errors.len())]
    Stream { errors: Vec<Option<ValidationError>> },
}

impl ValidationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ValidationError::Invalid(message.into())
    }
}

/// Crate-level convenience error.
///
/// A thin wrapper over the two canonical failure classes; callers that only
/// care about recoverability match on the `Validation` case.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum BlockError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl BlockError {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            BlockError::Validation(err) => Some(err),
            BlockError::Config(_) => None,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, BlockError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_names_the_problem() {
        let err = ConfigError::UnknownVariant {
            variant: "gallery".into(),
        };
        assert!(err.to_string().contains("gallery"));

        let err = ConfigError::MissingKey { key: "title".into() };
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn composite_validation_display_counts_failures() {
        let err = ValidationError::List {
            errors: vec![None, Some(ValidationError::Required), None],
        };
        assert_eq!(err.to_string(), "validation failed for 1 of 3 list item(s)");
    }

    #[test]
    fn block_error_classifies() {
        let err: BlockError = ValidationError::Required.into();
        assert!(err.as_validation().is_some());
        assert!(!err.is_config());

        let err: BlockError = ConfigError::MissingKey { key: "x".into() }.into();
        assert!(err.is_config());
        assert!(err.as_validation().is_none());
    }
}
