use serde_json::json;

use crate::{ObjectMode, ObjectShape, PathSegment, number, object, string};

#[test]
fn loose_preserves_unknown_properties() {
    let ty = object(ObjectShape::new().field("known", number())).expect("valid shape");
    assert_eq!(ty.mode(), ObjectMode::Loose);
    let out = ty.decode(&json!({"known": 1, "extra": "kept"})).unwrap();
    assert_eq!(out, json!({"known": 1, "extra": "kept"}));
}

#[test]
fn strict_accepts_exact_shape() {
    let ty = object(ObjectShape::new().field("a", number()).optional("b", string()))
        .expect("valid shape");
    let strict = ty.strict();
    assert_eq!(strict.mode(), ObjectMode::Strict);
    assert_eq!(
        strict.decode(&json!({"a": 1, "b": "x"})).unwrap(),
        json!({"a": 1, "b": "x"})
    );
    assert_eq!(strict.decode(&json!({"a": 1})).unwrap(), json!({"a": 1}));
}

#[test]
fn strict_rejects_unknown_properties() {
    let ty = object(ObjectShape::new().field("known", number())).expect("valid shape");
    let err = ty.strict().decode(&json!({"known": 1, "unknown": 2})).unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(
        err.mismatches()[0].path(),
        vec![PathSegment::Field("unknown".to_string())]
    );
    assert_eq!(err.mismatches()[0].expected(), "never");
    assert_eq!(err.mismatches()[0].actual(), Some(&json!(2)));
}

#[test]
fn strict_reports_field_errors_before_unknown_properties() {
    // When declared fields already fail, the unknown-property scan does not
    // run; only the field mismatches are reported.
    let ty = object(ObjectShape::new().field("a", number())).expect("valid shape");
    let err = ty.strict().decode(&json!({"b": 2})).unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(
        err.mismatches()[0].path(),
        vec![PathSegment::Field("a".to_string())]
    );
    assert_eq!(err.mismatches()[0].actual(), None);
}

#[test]
fn violet_drops_unknown_properties() {
    let ty = object(ObjectShape::new().field("known", number())).expect("valid shape");
    let violet = ty.violet();
    assert_eq!(violet.mode(), ObjectMode::Violet);
    let out = violet.decode(&json!({"known": 1, "unknown": 2})).unwrap();
    assert_eq!(out, json!({"known": 1}));
}

#[test]
fn violet_keeps_input_key_order() {
    let ty = object(ObjectShape::new().field("a", number()).field("b", number()))
        .expect("valid shape");
    let out = ty
        .violet()
        .decode(&json!({"b": 2, "x": 0, "a": 1}))
        .unwrap();
    assert_eq!(out.to_string(), r#"{"b":2,"a":1}"#);
}

#[test]
fn violet_still_validates_declared_fields() {
    let ty = object(ObjectShape::new().field("known", number())).expect("valid shape");
    let err = ty
        .violet()
        .decode(&json!({"known": "nope", "unknown": 2}))
        .unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(err.mismatches()[0].expected(), "number");
}

#[test]
fn violet_membership_ignores_extras() {
    let ty = object(ObjectShape::new().field("known", number())).expect("valid shape");
    assert!(ty.violet().is(&json!({"known": 1, "unknown": 2})));
    assert!(!ty.violet().is(&json!({"unknown": 2})));
}

#[test]
fn strict_optional_null_is_still_dropped() {
    let ty = object(ObjectShape::new().optional("e", number())).expect("valid shape");
    assert_eq!(ty.strict().decode(&json!({"e": null})).unwrap(), json!({}));
}

#[test]
fn mode_variants_decode_independently() {
    let base = object(ObjectShape::new().field("a", number())).expect("valid shape");
    let input = json!({"a": 1, "b": 2});
    assert_eq!(base.decode(&input).unwrap(), json!({"a": 1, "b": 2}));
    assert_eq!(base.violet().decode(&input).unwrap(), json!({"a": 1}));
    assert!(base.strict().decode(&input).is_err());
}
