//! Input document parsing tests

use num_bigint::BigInt;
use witcalc_spec::{parse_inputs, parse_integer_literal, InputError, InputValue, WitcalcError};

fn big(literal: &str) -> BigInt {
    BigInt::parse_bytes(literal.as_bytes(), 10).unwrap()
}

// ============================================================================
// Documents
// ============================================================================

#[test]
fn test_typical_document() {
    let inputs = parse_inputs(
        r#"{
            "a": "5",
            "key": ["0x01", "0x02", 3],
            "matrix": [[1, 2], [3, 4]],
            "big": "21888242871839275222246405745257275088548364400416034343698204186575808495616"
        }"#,
    )
    .unwrap();

    assert_eq!(inputs.len(), 4);
    assert_eq!(inputs["a"], InputValue::from(5i64));
    assert_eq!(inputs["key"].flatten(), vec![big("1"), big("2"), big("3")]);
    assert_eq!(inputs["matrix"].leaf_count(), 4);
    assert_eq!(
        inputs["big"].flatten(),
        vec![big("21888242871839275222246405745257275088548364400416034343698204186575808495616")]
    );
}

#[test]
fn test_names_iterate_sorted() {
    let inputs = parse_inputs(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
    let names: Vec<&str> = inputs.keys().map(String::as_str).collect();
    assert_eq!(names, ["a", "m", "z"]);
}

#[test]
fn test_empty_document() {
    assert!(parse_inputs("{}").unwrap().is_empty());
}

#[test]
fn test_large_json_numbers() {
    let inputs = parse_inputs(r#"{"u": 18446744073709551615, "n": -9223372036854775808}"#).unwrap();
    assert_eq!(inputs["u"].flatten(), vec![big("18446744073709551615")]);
    assert_eq!(inputs["n"].flatten(), vec![big("-9223372036854775808")]);
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_document_must_be_object() {
    let err = parse_inputs("[1, 2]").unwrap_err();
    assert!(matches!(err, WitcalcError::InvalidDocument(_)));
}

#[test]
fn test_malformed_json() {
    let err = parse_inputs(r#"{"a": "#).unwrap_err();
    assert!(matches!(err, WitcalcError::Json(_)));
}

#[test]
fn test_bad_literal_names_input() {
    let err = parse_inputs(r#"{"good": 1, "bad": "12abc"}"#).unwrap_err();
    assert_eq!(err.input_name(), Some("bad"));
    match err {
        WitcalcError::InvalidInput { source, .. } => {
            assert_eq!(source, InputError::BadLiteral("12abc".to_string()))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_nested_error_reports_index() {
    let err = parse_inputs(r#"{"xs": [1, [2, true]]}"#).unwrap_err();
    match err {
        WitcalcError::InvalidInput { name, source } => {
            assert_eq!(name, "xs");
            assert!(matches!(source, InputError::AtIndex { index: 1, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_null_and_object_rejected() {
    assert!(parse_inputs(r#"{"a": null}"#).is_err());
    assert!(parse_inputs(r#"{"a": {"b": 1}}"#).is_err());
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_literal_radixes() {
    assert_eq!(parse_integer_literal("255"), Some(big("255")));
    assert_eq!(parse_integer_literal("0xff"), Some(big("255")));
    assert_eq!(parse_integer_literal("0XFF"), Some(big("255")));
    assert_eq!(parse_integer_literal("0o377"), Some(big("255")));
    assert_eq!(parse_integer_literal("0b11111111"), Some(big("255")));
    assert_eq!(parse_integer_literal("-0x10"), Some(big("-16")));
    assert_eq!(parse_integer_literal("+7"), Some(big("7")));
}

#[test]
fn test_leading_zeros_are_decimal() {
    assert_eq!(parse_integer_literal("010"), Some(big("10")));
}

#[test]
fn test_literal_rejections() {
    for bad in ["", "-", "0x", "--1", "+-1", "1.5", " 1", "0xg", "abc"] {
        assert_eq!(parse_integer_literal(bad), None, "{bad:?}");
    }
}
