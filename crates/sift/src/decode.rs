use serde_json::{Map, Number, Value};

use crate::error::{Mismatch, Step};
use crate::object::ObjectSchema;
use crate::schema::{Conversion, Kind, Primitive, Schema};

/// Recursive decode. Mismatch trails are relative to `schema`; callers wrap
/// them with their own step before propagating upward.
pub(crate) fn decode_schema(schema: &Schema, input: &Value) -> Result<Value, Vec<Mismatch>> {
    match &schema.kind {
        Kind::Primitive(p) => decode_primitive(schema, *p, input),
        Kind::Refined { base, constraint } => {
            let value = decode_schema(base, input)?;
            if constraint.test(&value) {
                Ok(value)
            } else {
                Err(vec![Mismatch::leaf(constraint.label().to_string(), value)])
            }
        }
        Kind::Convert { base, conversion } => decode_convert(base, *conversion, input),
        Kind::Array { element } => decode_array(schema, element, input),
        Kind::Union { alternatives } => decode_union(alternatives, input),
        Kind::Object(object) => decode_object(schema, object, input),
    }
}

fn decode_primitive(schema: &Schema, p: Primitive, input: &Value) -> Result<Value, Vec<Mismatch>> {
    let matches = match p {
        Primitive::Boolean => input.is_boolean(),
        Primitive::Number => input.is_number(),
        Primitive::String => input.is_string(),
        Primitive::Null => input.is_null(),
        // A present value is never `undefined`; absence is handled by the
        // object combinator before any schema sees the field.
        Primitive::Undefined => false,
        Primitive::Any => true,
        Primitive::Never => false,
    };
    if matches {
        Ok(input.clone())
    } else {
        Err(vec![Mismatch::leaf(schema.name().to_string(), input.clone())])
    }
}

fn decode_convert(
    base: &Schema,
    conversion: Conversion,
    input: &Value,
) -> Result<Value, Vec<Mismatch>> {
    match conversion {
        Conversion::ParseFloat => {
            let parsed = input.as_str().and_then(parse_number);
            match parsed {
                Some(number) => decode_schema(base, &number),
                // Failures name the pre-conversion expected type.
                None => Err(vec![Mismatch::leaf(
                    base.name().to_string(),
                    input.clone(),
                )]),
            }
        }
    }
}

/// Numeric parse for string inputs. Integral strings stay integers; values
/// JSON cannot represent (NaN, infinities) count as parse failures.
fn parse_number(s: &str) -> Option<Value> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Number(Number::from(i)));
    }
    let f = s.parse::<f64>().ok()?;
    Number::from_f64(f).map(Value::Number)
}

fn decode_array(schema: &Schema, element: &Schema, input: &Value) -> Result<Value, Vec<Mismatch>> {
    let Some(items) = input.as_array() else {
        return Err(vec![Mismatch::leaf(schema.name().to_string(), input.clone())]);
    };
    let mut out = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match decode_schema(element, item) {
            Ok(value) => out.push(value),
            Err(nested) => errors.extend(nest(
                nested,
                Step::Index {
                    index,
                    ty: element.type_info(),
                },
            )),
        }
    }
    if errors.is_empty() {
        Ok(Value::Array(out))
    } else {
        Err(errors)
    }
}

fn decode_union(alternatives: &[Schema], input: &Value) -> Result<Value, Vec<Mismatch>> {
    let mut errors = Vec::new();
    for (index, alternative) in alternatives.iter().enumerate() {
        match decode_schema(alternative, input) {
            Ok(value) => return Ok(value),
            Err(nested) => errors.extend(nest(
                nested,
                Step::Branch {
                    index,
                    ty: alternative.type_info(),
                },
            )),
        }
    }
    Err(errors)
}

fn decode_object(
    schema: &Schema,
    object: &ObjectSchema,
    input: &Value,
) -> Result<Value, Vec<Mismatch>> {
    let Some(map) = input.as_object() else {
        return Err(vec![Mismatch::leaf(schema.name().to_string(), input.clone())]);
    };

    let fields = &object.fields;
    let mut out = map.clone();
    let mut errors = Vec::new();

    for (name, field_schema) in &fields.required {
        match map.get(name) {
            None => {
                let mut missing = Mismatch::missing(field_schema.name().to_string());
                missing.trail.push(Step::Field {
                    name: name.clone(),
                    ty: field_schema.type_info(),
                });
                errors.push(missing);
            }
            Some(value) => match decode_schema(field_schema, value) {
                Ok(decoded) => {
                    out.insert(name.clone(), decoded);
                }
                Err(nested) => errors.extend(nest(
                    nested,
                    Step::Field {
                        name: name.clone(),
                        ty: field_schema.type_info(),
                    },
                )),
            },
        }
    }

    for (name, checked) in &fields.optional_checked {
        match map.get(name) {
            None => {}
            // Explicit null is coerced to "absent": the key is dropped.
            Some(Value::Null) => {
                out.shift_remove(name);
            }
            Some(value) => match decode_schema(checked, value) {
                Ok(decoded) => {
                    out.insert(name.clone(), decoded);
                }
                Err(nested) => errors.extend(nest(
                    nested,
                    Step::Field {
                        name: name.clone(),
                        ty: checked.type_info(),
                    },
                )),
            },
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    match object.mode {
        crate::object::ObjectMode::Loose => Ok(Value::Object(out)),
        crate::object::ObjectMode::Strict => {
            let never = crate::schema::never();
            let mut extras = Vec::new();
            for (key, value) in map {
                if !fields.is_declared(key) {
                    let mut unexpected =
                        Mismatch::leaf(never.name().to_string(), value.clone());
                    unexpected.trail.push(Step::Field {
                        name: key.clone(),
                        ty: never.type_info(),
                    });
                    extras.push(unexpected);
                }
            }
            if extras.is_empty() {
                Ok(Value::Object(out))
            } else {
                Err(extras)
            }
        }
        crate::object::ObjectMode::Violet => {
            out.retain(|key, _| fields.is_declared(key));
            Ok(Value::Object(out))
        }
    }
}

fn nest(mut errors: Vec<Mismatch>, step: Step) -> Vec<Mismatch> {
    for mismatch in &mut errors {
        mismatch.trail.insert(0, step.clone());
    }
    errors
}

/// Structural inverse of decode. For this value model every combinator's
/// output representation equals its input representation, so encoding
/// recurses through declared structure and otherwise copies.
pub(crate) fn encode_schema(schema: &Schema, value: &Value) -> Value {
    match &schema.kind {
        Kind::Primitive(_) => value.clone(),
        Kind::Refined { base, .. } | Kind::Convert { base, .. } => encode_schema(base, value),
        Kind::Array { element } => match value.as_array() {
            Some(items) => Value::Array(
                items
                    .iter()
                    .map(|item| encode_schema(element, item))
                    .collect(),
            ),
            None => value.clone(),
        },
        Kind::Union { alternatives } => alternatives
            .iter()
            .find(|alternative| alternative.is(value))
            .map(|alternative| encode_schema(alternative, value))
            .unwrap_or_else(|| value.clone()),
        Kind::Object(object) => match value.as_object() {
            Some(map) => {
                let mut out: Map<String, Value> = map.clone();
                for (name, field_schema) in &object.fields.required {
                    if let Some(field_value) = map.get(name) {
                        out.insert(name.clone(), encode_schema(field_schema, field_value));
                    }
                }
                for (name, field_schema) in &object.fields.optional {
                    if let Some(field_value) = map.get(name) {
                        out.insert(name.clone(), encode_schema(field_schema, field_value));
                    }
                }
                Value::Object(out)
            }
            None => value.clone(),
        },
    }
}
