//! Block definitions.
//!
//! A `BlockDef` is an immutable schema node: shared definition state
//! (name, label, required flag, configured default, creation sequence)
//! plus one [`BlockKind`] case per leaf or container kind. Definitions are
//! constructed once at schema declaration time, bound to a name at most
//! once, and shared read-only for the process lifetime. Values flow
//! through them; they never hold values.

use std::sync::Arc;

use serde_json::{json, Map as JsonMap, Value as Json};

use crate::bound::BoundValue;
use crate::check::Diagnostic;
use crate::compose::next_sequence;
use crate::error::{BlockError, ConfigError, ValidationError};
use crate::field::{
    BooleanBlock, CharBlock, ChoiceBlock, DateBlock, DateTimeBlock, FloatBlock, IntegerBlock,
    ReferenceBlock, TextBlock, TimeBlock,
};
use crate::list::ListBlock;
use crate::stream::StreamBlock;
use crate::structure::StructBlock;
use crate::value::{StreamValue, Value};

/// Closed set of block kinds. Containers hold children as [`BlockDef`],
/// so arbitrary trees compose from these cases alone.
#[derive(Clone, Debug)]
pub enum BlockKind {
    Char(CharBlock),
    Text(TextBlock),
    Boolean(BooleanBlock),
    Integer(IntegerBlock),
    Float(FloatBlock),
    Date(DateBlock),
    Time(TimeBlock),
    DateTime(DateTimeBlock),
    Choice(ChoiceBlock),
    Reference(ReferenceBlock),
    Struct(StructBlock),
    List(ListBlock),
    Stream(StreamBlock),
}

impl BlockKind {
    pub fn tag(&self) -> &'static str {
        match self {
            BlockKind::Char(_) => "char",
            BlockKind::Text(_) => "text",
            BlockKind::Boolean(_) => "boolean",
            BlockKind::Integer(_) => "integer",
            BlockKind::Float(_) => "float",
            BlockKind::Date(_) => "date",
            BlockKind::Time(_) => "time",
            BlockKind::DateTime(_) => "datetime",
            BlockKind::Choice(_) => "choice",
            BlockKind::Reference(_) => "reference",
            BlockKind::Struct(_) => "struct",
            BlockKind::List(_) => "list",
            BlockKind::Stream(_) => "stream",
        }
    }

    fn descriptor(&self) -> Json {
        match self {
            BlockKind::Char(b) => b.descriptor(),
            BlockKind::Text(b) => b.descriptor(),
            BlockKind::Boolean(b) => b.descriptor(),
            BlockKind::Integer(b) => b.descriptor(),
            BlockKind::Float(b) => b.descriptor(),
            BlockKind::Date(b) => b.descriptor(),
            BlockKind::Time(b) => b.descriptor(),
            BlockKind::DateTime(b) => b.descriptor(),
            BlockKind::Choice(b) => b.descriptor(),
            BlockKind::Reference(b) => b.descriptor(),
            BlockKind::Struct(b) => b.descriptor(),
            BlockKind::List(b) => b.descriptor(),
            BlockKind::Stream(b) => b.descriptor(),
        }
    }

    /// Whether a native value is shaped for this kind, used to vet
    /// configured defaults.
    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => !matches!(
                self,
                BlockKind::Struct(_) | BlockKind::List(_) | BlockKind::Stream(_)
            ),
            (BlockKind::Char(_) | BlockKind::Text(_) | BlockKind::Choice(_), Value::Text(_)) => {
                true
            }
            (BlockKind::Boolean(_), Value::Bool(_)) => true,
            (BlockKind::Integer(_), Value::Int(_)) => true,
            (BlockKind::Float(_), Value::Float(_) | Value::Int(_)) => true,
            (BlockKind::Date(_), Value::Date(_)) => true,
            (BlockKind::Time(_), Value::Time(_)) => true,
            (BlockKind::DateTime(_), Value::DateTime(_)) => true,
            (BlockKind::Reference(_), Value::Entity(_)) => true,
            (BlockKind::Struct(_), Value::Struct(_)) => true,
            (BlockKind::List(_), Value::List(_)) => true,
            (BlockKind::Stream(_), Value::Stream(_)) => true,
            _ => false,
        }
    }
}

macro_rules! kind_from {
    ($($config:ident => $case:ident),* $(,)?) => {
        $(impl From<$config> for BlockKind {
            fn from(config: $config) -> Self {
                BlockKind::$case(config)
            }
        })*
    };
}

kind_from! {
    CharBlock => Char,
    TextBlock => Text,
    BooleanBlock => Boolean,
    IntegerBlock => Integer,
    FloatBlock => Float,
    DateBlock => Date,
    TimeBlock => Time,
    DateTimeBlock => DateTime,
    ChoiceBlock => Choice,
    ReferenceBlock => Reference,
    StructBlock => Struct,
    ListBlock => List,
    StreamBlock => Stream,
}

/// One schema node.
#[derive(Clone, Debug)]
pub struct BlockDef {
    /// Bound name; empty at the tree root or before binding.
    name: String,
    label: Option<String>,
    required: bool,
    default: Option<Value>,
    help_text: Option<String>,
    css_classes: Vec<String>,
    sequence: u64,
    kind: BlockKind,
    /// Reconstruction signature captured at construction. Together with
    /// the bound name this is the entire equality material, so two
    /// independently declared but identically shaped schemas compare
    /// equal.
    descriptor: Json,
}

impl BlockDef {
    pub fn new(kind: impl Into<BlockKind>) -> Self {
        let kind = kind.into();
        let mut def = Self {
            name: String::new(),
            label: None,
            required: true,
            default: None,
            help_text: None,
            css_classes: Vec::new(),
            sequence: next_sequence(),
            descriptor: Json::Null,
            kind,
        };
        def.rebuild_descriptor();
        def
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self.rebuild_descriptor();
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self.rebuild_descriptor();
        self
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self.rebuild_descriptor();
        self
    }

    pub fn with_css_classes<S: Into<String>>(mut self, classes: Vec<S>) -> Self {
        self.css_classes = classes.into_iter().map(Into::into).collect();
        self.rebuild_descriptor();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self.rebuild_descriptor();
        self
    }

    fn rebuild_descriptor(&mut self) {
        let mut desc = match self.kind.descriptor() {
            Json::Object(map) => map,
            other => {
                let mut map = JsonMap::new();
                map.insert("kind".to_string(), other);
                map
            }
        };
        desc.insert("required".to_string(), json!(self.required));
        if let Some(label) = &self.label {
            desc.insert("label".to_string(), json!(label));
        }
        if let Some(default) = &self.default {
            desc.insert("default".to_string(), default.to_json());
        }
        if let Some(help_text) = &self.help_text {
            desc.insert("help_text".to_string(), json!(help_text));
        }
        if !self.css_classes.is_empty() {
            desc.insert("css_classes".to_string(), json!(self.css_classes));
        }
        self.descriptor = Json::Object(desc);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name: the explicit label, else derived from the bound name
    /// (underscores become spaces, first letter capitalized).
    pub fn label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        derive_label(&self.name)
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn descriptor(&self) -> &Json {
        &self.descriptor
    }

    /// Bind the declared name. Definitions bind exactly once; a second
    /// bind is always a schema bug.
    pub(crate) fn bind_name(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.name.is_empty() {
            return Err(ConfigError::RebindForbidden {
                name: self.name.clone(),
            });
        }
        self.name = name.to_string();
        Ok(())
    }

    /// Convert a JSON-safe representation into the native value.
    ///
    /// Succeeds unconditionally for well-formed schemas: malformed stored
    /// content degrades to empty/null values instead of erroring.
    pub fn to_python(&self, raw: &Json) -> Result<Value, ConfigError> {
        match &self.kind {
            BlockKind::Char(b) => b.to_python(raw),
            BlockKind::Text(b) => b.to_python(raw),
            BlockKind::Boolean(b) => b.to_python(raw),
            BlockKind::Integer(b) => b.to_python(raw),
            BlockKind::Float(b) => b.to_python(raw),
            BlockKind::Date(b) => b.to_python(raw),
            BlockKind::Time(b) => b.to_python(raw),
            BlockKind::DateTime(b) => b.to_python(raw),
            BlockKind::Choice(b) => b.to_python(raw),
            BlockKind::Reference(b) => b.to_python(raw),
            BlockKind::Struct(b) => b.to_python(raw),
            BlockKind::List(b) => b.to_python(raw),
            BlockKind::Stream(b) => b.to_python(raw),
        }
    }

    /// Inverse of [`to_python`](Self::to_python) for serialization:
    /// `to_python(get_prep_value(v))` is structurally equal to `v` for all
    /// valid `v`.
    pub fn get_prep_value(&self, value: &Value) -> Result<Json, ConfigError> {
        match &self.kind {
            BlockKind::Char(b) => b.get_prep_value(value),
            BlockKind::Text(b) => b.get_prep_value(value),
            BlockKind::Boolean(b) => b.get_prep_value(value),
            BlockKind::Integer(b) => b.get_prep_value(value),
            BlockKind::Float(b) => b.get_prep_value(value),
            BlockKind::Date(b) => b.get_prep_value(value),
            BlockKind::Time(b) => b.get_prep_value(value),
            BlockKind::DateTime(b) => b.get_prep_value(value),
            BlockKind::Choice(b) => b.get_prep_value(value),
            BlockKind::Reference(b) => b.get_prep_value(value),
            BlockKind::Struct(b) => b.get_prep_value(value),
            BlockKind::List(b) => b.get_prep_value(value),
            BlockKind::Stream(b) => b.get_prep_value(value),
        }
    }

    /// Validate and return a (possibly normalized) value.
    ///
    /// Empty values short-circuit: required blocks reject them, optional
    /// blocks pass them through unvalidated. Structs are exempt — their
    /// children carry their own required flags.
    pub fn clean(&self, value: &Value) -> Result<Value, BlockError> {
        if value.is_empty() && !matches!(self.kind, BlockKind::Struct(_)) {
            if self.required {
                return Err(ValidationError::Required.into());
            }
            return Ok(value.clone());
        }
        match &self.kind {
            BlockKind::Char(b) => b.clean(value).map_err(Into::into),
            BlockKind::Text(b) => b.clean(value).map_err(Into::into),
            BlockKind::Boolean(b) => b.clean(value).map_err(Into::into),
            BlockKind::Integer(b) => b.clean(value).map_err(Into::into),
            BlockKind::Float(b) => b.clean(value).map_err(Into::into),
            BlockKind::Date(b) => b.clean(value).map_err(Into::into),
            BlockKind::Time(b) => b.clean(value).map_err(Into::into),
            BlockKind::DateTime(b) => b.clean(value).map_err(Into::into),
            BlockKind::Choice(b) => b.clean(value).map_err(Into::into),
            BlockKind::Reference(b) => b.clean(value).map_err(Into::into),
            BlockKind::Struct(b) => b.clean(value),
            BlockKind::List(b) => b.clean(value),
            BlockKind::Stream(b) => b.clean(value),
        }
    }

    /// This node's default value: the configured default if present
    /// (vetted against the kind), else a derived one — containers build
    /// from their children, text kinds give an empty string, booleans
    /// false, and the remaining leaves null.
    pub fn get_default(&self) -> Result<Value, ConfigError> {
        if let Some(default) = &self.default {
            if !self.kind.accepts(default) {
                return Err(ConfigError::BadDefault {
                    name: self.name.clone(),
                    expected: self.kind.tag(),
                });
            }
            return Ok(default.clone());
        }
        match &self.kind {
            BlockKind::Char(_) | BlockKind::Text(_) => Ok(Value::Text(String::new())),
            BlockKind::Boolean(_) => Ok(Value::Bool(false)),
            BlockKind::Struct(b) => b.derived_default(),
            BlockKind::List(b) => b.derived_default(),
            BlockKind::Stream(_) => Ok(Value::Stream(StreamValue::default())),
            _ => Ok(Value::Null),
        }
    }

    /// Plain-text fragments for full-text indexing. Containers concatenate
    /// their children's fragments in child order; non-textual leaves
    /// contribute nothing.
    pub fn get_searchable_content(&self, value: &Value) -> Vec<String> {
        match &self.kind {
            BlockKind::Char(b) => b.searchable(value),
            BlockKind::Text(b) => b.searchable(value),
            BlockKind::Choice(b) => b.searchable(value),
            BlockKind::Struct(b) => b.searchable(value),
            BlockKind::List(b) => b.searchable(value),
            BlockKind::Stream(b) => b.searchable(value),
            _ => Vec::new(),
        }
    }

    /// Static self-validation of the definition tree. Containers recurse
    /// into children and aggregate; the root's own (possibly empty) name
    /// is not checked, since roots are legitimately unnamed.
    pub fn check(&self) -> Vec<Diagnostic> {
        match &self.kind {
            BlockKind::Struct(b) => b.check(),
            BlockKind::List(b) => b.check(),
            BlockKind::Stream(b) => b.check(),
            _ => Vec::new(),
        }
    }

    /// Render context for the external template collaborator: the parent
    /// context merged with the serialized value (under both `self` and
    /// `value`) and this block's CSS class list.
    pub fn get_context(
        &self,
        value: &Value,
        parent_context: Option<&JsonMap<String, Json>>,
    ) -> JsonMap<String, Json> {
        let mut context = parent_context.cloned().unwrap_or_default();
        let rendered = value.to_json();
        context.insert("self".to_string(), rendered.clone());
        context.insert("css_classes".to_string(), json!(self.css_classes));
        context.insert("value".to_string(), rendered);
        context
    }

    /// Pair this definition with a concrete value for one-shot operations.
    pub fn bind(self: &Arc<Self>, value: Value) -> BoundValue {
        BoundValue::new(Arc::clone(self), value)
    }

    /// Deserialize the persisted text form of a field backed by this
    /// definition. Empty text and a stored JSON `null` give the empty
    /// value; non-JSON text degrades (streams keep it as raw text, other
    /// kinds go empty) rather than erroring.
    pub fn from_stored_text(&self, stored: &str) -> Result<Value, ConfigError> {
        if stored.is_empty() {
            return Ok(self.empty_value());
        }
        match serde_json::from_str::<Json>(stored) {
            Ok(Json::Null) => Ok(self.empty_value()),
            Ok(raw) => self.to_python(&raw),
            Err(_) => {
                if matches!(self.kind, BlockKind::Stream(_)) {
                    tracing::warn!(
                        len = stored.len(),
                        "stored content is not valid JSON; keeping it as raw text"
                    );
                    Ok(Value::Stream(StreamValue::legacy(stored)))
                } else {
                    tracing::warn!(
                        len = stored.len(),
                        "stored content is not valid JSON; treating it as empty"
                    );
                    Ok(self.empty_value())
                }
            }
        }
    }

    /// Serialize a native value to the persisted text form. An empty
    /// stream carrying legacy raw text writes that text back verbatim.
    pub fn to_stored_text(&self, value: &Value) -> Result<String, ConfigError> {
        if let Value::Stream(stream) = value {
            if stream.is_empty() {
                if let Some(raw_text) = stream.raw_text() {
                    return Ok(raw_text.to_string());
                }
            }
        }
        let prepped = self.get_prep_value(value)?;
        serde_json::to_string(&prepped).map_err(|err| ConfigError::Encode {
            reason: err.to_string(),
        })
    }

    fn empty_value(&self) -> Value {
        match &self.kind {
            BlockKind::Stream(_) => Value::Stream(StreamValue::default()),
            BlockKind::List(_) => Value::List(Vec::new()),
            _ => Value::Null,
        }
    }
}

/// Two definitions are equal iff their bound names match and their
/// reconstruction descriptors match. Instances are interchangeable as
/// composite-key material: identity never matters.
impl PartialEq for BlockDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.descriptor == other.descriptor
    }
}

fn derive_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
