use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::decode;
use crate::error::{DecodeErrors, SchemaError, TypeInfo};
use crate::object::ObjectSchema;

/// An immutable type descriptor: a decode rule paired with a display name.
///
/// Schemas are composed bottom-up; every combinator returns a new value and
/// never mutates its input, so one schema can serve as a building block for
/// any number of larger schemas.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) name: String,
    pub(crate) kind: Kind,
}

#[derive(Debug, Clone)]
pub(crate) enum Kind {
    Primitive(Primitive),
    Refined {
        base: Box<Schema>,
        constraint: Constraint,
    },
    Convert {
        base: Box<Schema>,
        conversion: Conversion,
    },
    Array {
        element: Box<Schema>,
    },
    Union {
        alternatives: Vec<Schema>,
    },
    Object(ObjectSchema),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Primitive {
    Boolean,
    Number,
    String,
    Null,
    Undefined,
    Any,
    Never,
}

impl Primitive {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::Null => "null",
            Primitive::Undefined => "undefined",
            Primitive::Any => "any",
            Primitive::Never => "never",
        }
    }
}

/// A predicate narrowing a base schema, with its display label and (where
/// applicable) the numeric bounds it encodes.
#[derive(Clone)]
pub struct Constraint {
    pub(crate) label: String,
    pub(crate) op: RefineOp,
}

#[derive(Clone)]
pub(crate) enum RefineOp {
    Max(f64),
    Min(f64),
    Greater(f64),
    Less(f64),
    Integer,
    Finite,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    Custom(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

/// Largest integer exactly representable in an f64 (2^53 - 1).
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

impl Constraint {
    fn new(label: impl Into<String>, op: RefineOp) -> Self {
        Constraint {
            label: label.into(),
            op,
        }
    }

    /// Display label, e.g. `"<=5"`, `"integer"`, `"+"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// `(lower, upper)` numeric bounds encoded by this constraint, for
    /// introspection and tooling; both `None` for non-numeric predicates.
    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        match self.op {
            RefineOp::Max(limit) | RefineOp::Less(limit) => (None, Some(limit)),
            RefineOp::Min(limit) | RefineOp::Greater(limit) => (Some(limit), None),
            _ => (None, None),
        }
    }

    pub(crate) fn test(&self, value: &Value) -> bool {
        match &self.op {
            RefineOp::Max(limit) => value.as_f64().is_some_and(|n| n <= *limit),
            RefineOp::Min(limit) => value.as_f64().is_some_and(|n| n >= *limit),
            RefineOp::Greater(limit) => value.as_f64().is_some_and(|n| n > *limit),
            RefineOp::Less(limit) => value.as_f64().is_some_and(|n| n < *limit),
            RefineOp::Integer => is_safe_integer(value),
            RefineOp::Finite => value.as_f64().is_some_and(f64::is_finite),
            RefineOp::MinLength(len) => value.as_str().is_some_and(|s| s.chars().count() >= *len),
            RefineOp::MaxLength(len) => value.as_str().is_some_and(|s| s.chars().count() <= *len),
            RefineOp::Pattern(re) => value.as_str().is_some_and(|s| re.is_match(s)),
            RefineOp::Custom(predicate) => predicate(value),
        }
    }
}

impl std::fmt::Debug for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constraint")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

fn is_safe_integer(value: &Value) -> bool {
    let Value::Number(n) = value else {
        return false;
    };
    if let Some(i) = n.as_i64() {
        i.unsigned_abs() <= MAX_SAFE_INTEGER
    } else if let Some(u) = n.as_u64() {
        u <= MAX_SAFE_INTEGER
    } else {
        n.as_f64()
            .is_some_and(|f| f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER as f64)
    }
}

/// A value-transforming refinement step (unlike a plain constraint, the
/// decoded value differs from the input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conversion {
    ParseFloat,
}

impl Conversion {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Conversion::ParseFloat => "parseFloat",
        }
    }
}

pub fn boolean() -> Schema {
    Schema::primitive(Primitive::Boolean)
}

pub fn number() -> Schema {
    Schema::primitive(Primitive::Number)
}

pub fn string() -> Schema {
    Schema::primitive(Primitive::String)
}

pub fn null() -> Schema {
    Schema::primitive(Primitive::Null)
}

/// Matches only the absence of a value; present values (including null)
/// fail. Mostly useful as the implicit second alternative of optional
/// object fields.
pub fn undefined() -> Schema {
    Schema::primitive(Primitive::Undefined)
}

pub fn any() -> Schema {
    Schema::primitive(Primitive::Any)
}

/// Matches nothing. Strict-mode objects report unexpected properties
/// against this type.
pub fn never() -> Schema {
    Schema::primitive(Primitive::Never)
}

/// Sequence of `element`-typed values, named `element[]`. Every element is
/// decoded independently and all failing indices are reported together.
pub fn array(element: impl Into<Schema>) -> Schema {
    let element = element.into();
    Schema {
        name: format!("{}[]", element.name),
        kind: Kind::Array {
            element: Box::new(element),
        },
    }
}

/// Matches any one of `alternatives`, tried in declared order; the first
/// success wins. Named `(a | b | ...)`.
pub fn one_of(alternatives: Vec<Schema>) -> Schema {
    let name = format!(
        "({})",
        alternatives
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    );
    Schema {
        name,
        kind: Kind::Union { alternatives },
    }
}

impl Schema {
    fn primitive(p: Primitive) -> Schema {
        Schema {
            name: p.name().to_string(),
            kind: Kind::Primitive(p),
        }
    }

    /// Human-readable type label, used verbatim in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decode `input` against this schema, returning the typed value or
    /// every leaf-level mismatch found.
    pub fn decode(&self, input: &Value) -> Result<Value, DecodeErrors> {
        decode::decode_schema(self, input).map_err(|mismatches| DecodeErrors {
            root: self.type_info(),
            mismatches,
        })
    }

    /// Inverse of [`decode`](Schema::decode); structural identity for this
    /// value model (declared fields and elements encoded recursively).
    pub fn encode(&self, value: &Value) -> Value {
        decode::encode_schema(self, value)
    }

    /// Membership predicate: would `decode` succeed?
    pub fn is(&self, input: &Value) -> bool {
        decode::decode_schema(self, input).is_ok()
    }

    /// Extend this schema with a further alternative; the receiver is the
    /// primary alternative and keeps priority. Extending an existing union
    /// appends, so the joined name stays flat.
    pub fn allow(self, alternative: Schema) -> Schema {
        match self.kind {
            Kind::Union { mut alternatives } => {
                alternatives.push(alternative);
                one_of(alternatives)
            }
            _ => one_of(vec![self, alternative]),
        }
    }

    fn constrain(self, constraint: Constraint) -> Schema {
        Schema {
            name: chained_name(&self, &constraint.label),
            kind: Kind::Refined {
                base: Box::new(self),
                constraint,
            },
        }
    }

    pub fn max(self, limit: f64) -> Schema {
        self.constrain(Constraint::new(format!("<={limit}"), RefineOp::Max(limit)))
    }

    pub fn min(self, limit: f64) -> Schema {
        self.constrain(Constraint::new(format!(">={limit}"), RefineOp::Min(limit)))
    }

    pub fn greater(self, limit: f64) -> Schema {
        self.constrain(Constraint::new(format!(">{limit}"), RefineOp::Greater(limit)))
    }

    pub fn less(self, limit: f64) -> Schema {
        self.constrain(Constraint::new(format!("<{limit}"), RefineOp::Less(limit)))
    }

    pub fn negative(self) -> Schema {
        self.constrain(Constraint::new("-", RefineOp::Less(0.0)))
    }

    pub fn positive(self) -> Schema {
        self.constrain(Constraint::new("+", RefineOp::Greater(0.0)))
    }

    pub fn integer(self) -> Schema {
        self.constrain(Constraint::new("integer", RefineOp::Integer))
    }

    pub fn finite(self) -> Schema {
        self.constrain(Constraint::new("finite", RefineOp::Finite))
    }

    pub fn min_length(self, len: usize) -> Schema {
        self.constrain(Constraint::new(
            format!("length>={len}"),
            RefineOp::MinLength(len),
        ))
    }

    pub fn max_length(self, len: usize) -> Schema {
        self.constrain(Constraint::new(
            format!("length<={len}"),
            RefineOp::MaxLength(len),
        ))
    }

    /// Narrow string values to those matching `pattern` (full regex syntax,
    /// unanchored). Fails at composition time on an invalid pattern.
    pub fn pattern(self, pattern: &str) -> Result<Schema, SchemaError> {
        let re = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.constrain(Constraint::new(format!("/{pattern}/"), RefineOp::Pattern(re))))
    }

    /// Narrow by an arbitrary predicate over the decoded value. `label` is
    /// what failures report as the expected type.
    pub fn refine(
        self,
        label: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Schema {
        self.constrain(Constraint::new(
            label,
            RefineOp::Custom(Arc::new(predicate)),
        ))
    }

    /// Accept numeric strings by parsing them before decoding against the
    /// base. Non-string inputs and unparseable strings fail with the base's
    /// (pre-conversion) expected type.
    pub fn parse_float(self) -> Schema {
        Schema {
            name: chained_name(&self, Conversion::ParseFloat.label()),
            kind: Kind::Convert {
                base: Box::new(self),
                conversion: Conversion::ParseFloat,
            },
        }
    }

    /// Constraints applied on top of the base type, innermost first.
    pub fn constraints(&self) -> Vec<&Constraint> {
        let mut chain = Vec::new();
        let mut cursor = self;
        loop {
            match &cursor.kind {
                Kind::Refined { base, constraint } => {
                    chain.push(constraint);
                    cursor = base;
                }
                Kind::Convert { base, .. } => cursor = base,
                _ => break,
            }
        }
        chain.reverse();
        chain
    }

    pub(crate) fn type_info(&self) -> TypeInfo {
        TypeInfo {
            name: self.name.clone(),
            is_union: matches!(self.kind, Kind::Union { .. }),
        }
    }
}

/// `number` refined by `<=5` is named `number(<=5)`; refining again appends
/// to the option list: `number(<=5, integer)`.
fn chained_name(base: &Schema, label: &str) -> String {
    let mut labels = vec![label.to_string()];
    let mut cursor = base;
    loop {
        match &cursor.kind {
            Kind::Refined { base, constraint } => {
                labels.insert(0, constraint.label.clone());
                cursor = base;
            }
            Kind::Convert { base, conversion } => {
                labels.insert(0, conversion.label().to_string());
                cursor = base;
            }
            _ => break,
        }
    }
    format!("{}({})", cursor.name, labels.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_names() {
        assert_eq!(boolean().name(), "boolean");
        assert_eq!(number().name(), "number");
        assert_eq!(string().name(), "string");
        assert_eq!(null().name(), "null");
        assert_eq!(undefined().name(), "undefined");
        assert_eq!(any().name(), "any");
        assert_eq!(never().name(), "never");
    }

    #[test]
    fn union_and_array_names() {
        let ty = array(string().allow(number()));
        assert_eq!(ty.name(), "(string | number)[]");

        let wide = string().allow(number()).allow(boolean());
        assert_eq!(wide.name(), "(string | number | boolean)");
    }

    #[test]
    fn refinement_names_chain() {
        assert_eq!(number().max(5.0).name(), "number(<=5)");
        assert_eq!(number().max(5.0).integer().name(), "number(<=5, integer)");
        assert_eq!(
            number().parse_float().min(0.5).name(),
            "number(parseFloat, >=0.5)"
        );
        assert_eq!(number().negative().name(), "number(-)");
        assert_eq!(number().positive().name(), "number(+)");
    }

    #[test]
    fn naming_is_deterministic() {
        let a = array(string().allow(number())).name().to_string();
        let b = array(string().allow(number())).name().to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn constraint_bounds_introspection() {
        let ty = number().min(1.0).max(5.0);
        let constraints = ty.constraints();
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints[0].label(), ">=1");
        assert_eq!(constraints[0].bounds(), (Some(1.0), None));
        assert_eq!(constraints[1].label(), "<=5");
        assert_eq!(constraints[1].bounds(), (None, Some(5.0)));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = string().pattern("(unclosed").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn safe_integer_check() {
        use serde_json::json;
        assert!(is_safe_integer(&json!(42)));
        assert!(is_safe_integer(&json!(-42)));
        assert!(is_safe_integer(&json!(9_007_199_254_740_991i64)));
        assert!(!is_safe_integer(&json!(9_007_199_254_740_993i64)));
        assert!(!is_safe_integer(&json!(1.5)));
        assert!(!is_safe_integer(&json!("42")));
    }
}
