use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::message;

/// Error raised while composing a schema, before any value is decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("field '{field}' declared as both required and optional")]
    DuplicateField { field: String },
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// One rendered path hop: an object field or an array index.
///
/// Union branches are tracked internally but never extend the path — the
/// failing alternatives of one union all report at the same location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Snapshot of a schema's identity taken when an error is recorded.
#[derive(Debug, Clone)]
pub(crate) struct TypeInfo {
    pub name: String,
    pub is_union: bool,
}

/// One hop in a mismatch trail, from the failing schema's root down to the
/// leaf that rejected the value.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Field { name: String, ty: TypeInfo },
    Index { index: usize, ty: TypeInfo },
    Branch { index: usize, ty: TypeInfo },
}

impl Step {
    pub(crate) fn ty(&self) -> &TypeInfo {
        match self {
            Step::Field { ty, .. } | Step::Index { ty, .. } | Step::Branch { ty, .. } => ty,
        }
    }
}

/// A single leaf-level mismatch: the value at `path()` was expected to be
/// `expected()` and was not.
///
/// `actual() == None` means the location held no value at all (a missing
/// required field); it renders as the bare token `undefined`.
#[derive(Debug, Clone)]
pub struct Mismatch {
    pub(crate) trail: Vec<Step>,
    pub(crate) expected: String,
    pub(crate) actual: Option<Value>,
}

impl Mismatch {
    pub(crate) fn leaf(expected: impl Into<String>, actual: Value) -> Self {
        Mismatch {
            trail: Vec::new(),
            expected: expected.into(),
            actual: Some(actual),
        }
    }

    pub(crate) fn missing(expected: impl Into<String>) -> Self {
        Mismatch {
            trail: Vec::new(),
            expected: expected.into(),
            actual: None,
        }
    }

    /// Field/index path to the mismatch, union branches elided.
    pub fn path(&self) -> Vec<PathSegment> {
        self.trail
            .iter()
            .filter_map(|step| match step {
                Step::Field { name, .. } => Some(PathSegment::Field(name.clone())),
                Step::Index { index, .. } => Some(PathSegment::Index(*index)),
                Step::Branch { .. } => None,
            })
            .collect()
    }

    /// Name of the type (or refinement label) the value failed against.
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// The rejected value, or `None` for a missing required field.
    pub fn actual(&self) -> Option<&Value> {
        self.actual.as_ref()
    }
}

/// Serializable view of one mismatch, for programmatic consumers.
#[derive(Debug, Serialize)]
pub struct MismatchReport<'a> {
    pub path: Vec<PathSegment>,
    pub expected: &'a str,
    pub actual: Option<&'a Value>,
}

/// Every leaf-level mismatch discovered by one failed decode call.
///
/// The `Display` impl renders the full indented diagnostic message; callers
/// who want structured access iterate [`DecodeErrors::mismatches`].
#[derive(Debug, Clone)]
pub struct DecodeErrors {
    pub(crate) root: TypeInfo,
    pub(crate) mismatches: Vec<Mismatch>,
}

impl DecodeErrors {
    /// Name of the top-level schema the decode was attempted against.
    pub fn root_name(&self) -> &str {
        &self.root.name
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// `(path, expected, actual)` records, one per leaf, in report order.
    pub fn reports(&self) -> Vec<MismatchReport<'_>> {
        self.mismatches
            .iter()
            .map(|m| MismatchReport {
                path: m.path(),
                expected: m.expected(),
                actual: m.actual(),
            })
            .collect()
    }
}

impl std::fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&message::create_message(self))
    }
}

impl std::error::Error for DecodeErrors {}
