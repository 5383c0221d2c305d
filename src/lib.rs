//! Block-composition engine for rich structured content persisted as JSON
//! text.
//!
//! A schema is a tree of [`BlockDef`] nodes: leaf field blocks (text,
//! numbers, dates, choices, entity references) composed by three container
//! kinds (struct, list, stream). Stored JSON deserializes through the root
//! definition into a native [`Value`] tree, is validated by recursive
//! `clean`, and serializes back to JSON.
//!
//! Module hierarchy follows type dependency order:
//! - error: ConfigError, ValidationError, BlockError (Layer 0)
//! - check: Diagnostic, definition self-validation (Layer 0)
//! - value: Value, StructValue, StreamValue, Entity (Layer 1)
//! - compose: creation sequence + declarative child composition (Layer 2)
//! - field: leaf block kinds (Layer 3)
//! - structure, list, stream: container kinds (Layer 4)
//! - block: BlockDef and kind dispatch (Layer 5)
//! - bound: BoundValue (Layer 6)
//! - form: structured form-data reconciliation (Layer 6)

#![forbid(unsafe_code)]

pub mod block;
pub mod bound;
pub mod check;
pub mod compose;
pub mod error;
pub mod field;
pub mod form;
pub mod list;
pub mod stream;
pub mod structure;
pub mod value;

pub use block::{BlockDef, BlockKind};
pub use bound::BoundValue;
pub use check::{Diagnostic, Severity};
pub use compose::{child, compose, shadow, ChildDecl};
pub use error::{BlockError, ConfigError, ValidationError};
pub use field::{
    BooleanBlock, CharBlock, ChoiceBlock, DateBlock, DateTimeBlock, EntityResolver, FloatBlock,
    IntegerBlock, ReferenceBlock, TextBlock, TimeBlock,
};
pub use form::FormData;
pub use list::{reconcile, ListBlock, ListEditEntry};
pub use stream::StreamBlock;
pub use structure::StructBlock;
pub use value::{Entity, StreamChild, StreamValue, StructValue, Value};

pub type Result<T> = std::result::Result<T, BlockError>;
