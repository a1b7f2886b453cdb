use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{DecodeErrors, SchemaError};
use crate::schema::{Kind, Schema, one_of, undefined};

/// How an object schema treats input properties outside its declared shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectMode {
    /// Unknown properties are permitted and preserved in the output.
    Loose,
    /// Unknown properties are reported as errors against the never type.
    Strict,
    /// Unknown properties are silently dropped from the output.
    Violet,
}

impl ObjectMode {
    fn suffix(self) -> &'static str {
        match self {
            ObjectMode::Loose => "",
            ObjectMode::Strict => "(strict)",
            ObjectMode::Violet => "(violet)",
        }
    }
}

/// Declared field maps of an object schema. Shared read-only between the
/// loose/strict/violet variants of one shape.
#[derive(Debug)]
pub(crate) struct ObjectFields {
    pub required: IndexMap<String, Schema>,
    pub optional: IndexMap<String, Schema>,
    /// Per optional field, the implicit `(inner | undefined)` union it is
    /// actually decoded against.
    pub optional_checked: IndexMap<String, Schema>,
}

impl ObjectFields {
    pub(crate) fn is_declared(&self, key: &str) -> bool {
        self.required.contains_key(key) || self.optional.contains_key(key)
    }
}

/// Configuration consumed by [`object`]: required fields, optional fields,
/// and an optional explicit name.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    required: IndexMap<String, Schema>,
    optional: IndexMap<String, Schema>,
    name: Option<String>,
}

impl ObjectShape {
    pub fn new() -> Self {
        ObjectShape::default()
    }

    /// Declare a required field. Declaration order drives the derived name
    /// and diagnostic ordering.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.required.insert(name.into(), schema.into());
        self
    }

    /// Declare an optional field: it may be absent or explicitly null
    /// (coerced to absent) without failing the decode.
    pub fn optional(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.optional.insert(name.into(), schema.into());
        self
    }

    /// Override the derived `{ field: type, ... }` name; the explicit name
    /// then appears verbatim in nested diagnostics.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An object type descriptor in one of three matching modes. Convert with
/// `Schema::from` (or let combinators like [`ObjectSchema::allow`] do it).
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub(crate) fields: Arc<ObjectFields>,
    pub(crate) mode: ObjectMode,
    base_name: String,
}

/// Build an object schema from `shape`, in loose mode.
pub fn object(shape: ObjectShape) -> Result<ObjectSchema, SchemaError> {
    for field in shape.optional.keys() {
        if shape.required.contains_key(field) {
            return Err(SchemaError::DuplicateField {
                field: field.clone(),
            });
        }
    }
    let optional_checked = shape
        .optional
        .iter()
        .map(|(name, inner)| (name.clone(), one_of(vec![inner.clone(), undefined()])))
        .collect();
    let base_name = shape
        .name
        .unwrap_or_else(|| derived_name(&shape.required, &shape.optional));
    Ok(ObjectSchema {
        fields: Arc::new(ObjectFields {
            required: shape.required,
            optional: shape.optional,
            optional_checked,
        }),
        mode: ObjectMode::Loose,
        base_name,
    })
}

impl ObjectSchema {
    /// Reject any input property outside the declared shape. Shares the
    /// field maps with the receiver; nothing is copied.
    pub fn strict(&self) -> ObjectSchema {
        self.with_mode(ObjectMode::Strict)
    }

    /// Silently drop input properties outside the declared shape. Shares
    /// the field maps with the receiver; nothing is copied.
    pub fn violet(&self) -> ObjectSchema {
        self.with_mode(ObjectMode::Violet)
    }

    fn with_mode(&self, mode: ObjectMode) -> ObjectSchema {
        ObjectSchema {
            fields: Arc::clone(&self.fields),
            mode,
            base_name: self.base_name.clone(),
        }
    }

    pub fn mode(&self) -> ObjectMode {
        self.mode
    }

    /// Effective display name: base (explicit or derived) plus mode suffix,
    /// e.g. `InterfaceA(violet)`.
    pub fn name(&self) -> String {
        format!("{}{}", self.base_name, self.mode.suffix())
    }

    pub fn decode(&self, input: &Value) -> Result<Value, DecodeErrors> {
        Schema::from(self.clone()).decode(input)
    }

    pub fn encode(&self, value: &Value) -> Value {
        Schema::from(self.clone()).encode(value)
    }

    pub fn is(&self, input: &Value) -> bool {
        Schema::from(self.clone()).is(input)
    }

    /// Extend with an alternative type, keeping this object as the primary
    /// alternative.
    pub fn allow(self, alternative: Schema) -> Schema {
        Schema::from(self).allow(alternative)
    }

    /// Add a custom predicate refinement on top of the object shape.
    pub fn refine(
        self,
        label: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Schema {
        Schema::from(self).refine(label, predicate)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Schema {
        Schema {
            name: object.name(),
            kind: Kind::Object(object),
        }
    }
}

/// `{ a: string, b?: number }`; the empty shape derives `{}`.
fn derived_name(required: &IndexMap<String, Schema>, optional: &IndexMap<String, Schema>) -> String {
    let parts: Vec<String> = required
        .iter()
        .map(|(field, schema)| format!("{field}: {}", schema.name()))
        .chain(
            optional
                .iter()
                .map(|(field, schema)| format!("{field}?: {}", schema.name())),
        )
        .collect();
    if parts.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", parts.join(", "))
    }
}
