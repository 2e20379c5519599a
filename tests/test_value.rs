//! Value accessors, conversions and serde integration.

use serde_derive::Serialize;
use yaml_for_humans::{from_str, to_string, to_value, Mapping, Number, Value};

#[test]
fn accessors() {
    let doc = from_str("a: 1\nb: text\nc: [x]\nd: true\ne: ~").unwrap();

    assert_eq!(doc.get("a").and_then(Value::as_i64), Some(1));
    assert_eq!(doc.get("b").and_then(Value::as_str), Some("text"));
    assert!(doc.get("c").and_then(Value::as_sequence).is_some());
    assert_eq!(doc.get("d").and_then(Value::as_bool), Some(true));
    assert!(doc.get("e").unwrap().is_null());
    assert!(doc.get("missing").is_none());
    assert!(doc.as_mapping().is_some());
    assert!(doc.get("a").unwrap().is_scalar());
    assert!(!doc.is_scalar());
}

#[test]
fn conversions() {
    assert_eq!(Value::from("text"), Value::String("text".to_owned()));
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(3i64), Value::Number(Number::from(3i64)));
    assert_eq!(Value::from(3u8), Value::from(3i32));

    let seq = Value::from(vec![Value::from(1), Value::from(2)]);
    assert_eq!(seq.as_sequence().map(|s| s.len()), Some(2));
}

#[test]
fn numbers_compare_across_representations() {
    assert_eq!(Number::from(7u64), Number::from(7i32));
    assert_ne!(Number::from(7), Number::from(7.0));
    assert_eq!(Number::from(1.5).as_f64(), Some(1.5));
    assert!(Number::from(f64::NAN).is_nan());
    assert_eq!(Number::from(-3).as_i64(), Some(-3));
    assert_eq!(Number::from(-3).as_u64(), None);
}

#[test]
fn number_display_uses_yaml_spellings() {
    assert_eq!(Number::from(42).to_string(), "42");
    assert_eq!(Number::from(1.5).to_string(), "1.5");
    assert_eq!(Number::from(1.0f64).to_string(), "1.0");
    assert_eq!(Number::from(f64::INFINITY).to_string(), ".inf");
    assert_eq!(Number::from(f64::NEG_INFINITY).to_string(), "-.inf");
    assert_eq!(Number::from(f64::NAN).to_string(), ".nan");
}

#[test]
fn mapping_equality_ignores_formatting() {
    let mut left = Mapping::new();
    left.insert(Value::from("a"), Value::from(1));
    let mut right = Mapping::new();
    right.insert(Value::from("a"), Value::from(1));
    right
        .formatting_mut(Value::from("a"))
        .set_blank_lines_before(2);
    assert_eq!(left, right);
}

#[derive(Serialize)]
struct Container {
    name: &'static str,
    image: &'static str,
    ports: Vec<u16>,
}

#[derive(Serialize)]
struct PodSpec {
    replicas: u32,
    containers: Vec<Container>,
}

#[test]
fn to_value_builds_mappings_in_field_order() {
    let spec = PodSpec {
        replicas: 2,
        containers: vec![Container {
            name: "web",
            image: "nginx:latest",
            ports: vec![80, 443],
        }],
    };

    let value = to_value(&spec).unwrap();
    assert_eq!(value.get("replicas").and_then(Value::as_u64), Some(2));

    let out = to_string(&value).unwrap();
    assert_eq!(
        out,
        "replicas: 2\ncontainers:\n  -\n    name: web\n    image: nginx:latest\n    ports:\n      - 80\n      - 443\n"
    );
}

#[derive(Serialize)]
enum Backend {
    Memory,
    Disk { path: &'static str },
}

#[test]
fn to_value_handles_enums() {
    assert_eq!(
        to_value(&Backend::Memory).unwrap(),
        Value::String("Memory".to_owned())
    );

    let disk = to_value(&Backend::Disk { path: "/var/data" }).unwrap();
    assert_eq!(
        disk.get("Disk").unwrap().get("path").and_then(Value::as_str),
        Some("/var/data")
    );
}

#[test]
fn to_value_options_and_units() {
    assert_eq!(to_value(&Option::<u8>::None).unwrap(), Value::Null);
    assert_eq!(to_value(&Some(5u8)).unwrap(), Value::from(5));
    assert_eq!(to_value(&()).unwrap(), Value::Null);
}
