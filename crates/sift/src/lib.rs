//! Runtime value validation: composable schema combinators over in-memory
//! JSON values, with structured failure trees and an indented diagnostic
//! renderer.

mod decode;
mod error;
mod message;
mod object;
mod schema;

pub use error::{DecodeErrors, Mismatch, MismatchReport, PathSegment, SchemaError};
pub use message::create_message;
pub use object::{ObjectMode, ObjectSchema, ObjectShape, object};
pub use schema::{
    Constraint, Schema, any, array, boolean, never, null, number, one_of, string, undefined,
};

#[cfg(test)]
mod tests;
