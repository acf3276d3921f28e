use super::*;
use serde_json::json;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Rgba8 = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Rgba8::rgb(255, 0, 0));

    let c: Rgba8 = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert_eq!(c, Rgba8::rgba(0, 0, 255, 128));
}

#[test]
fn parses_names_objects_and_arrays() {
    let c: Rgba8 = serde_json::from_value(json!("White")).unwrap();
    assert_eq!(c, Rgba8::rgb(255, 255, 255));

    let c: Rgba8 = serde_json::from_value(json!({"r": 1.0, "g": 0.5, "b": 0.0})).unwrap();
    assert_eq!(c, Rgba8::rgb(255, 128, 0));

    let c: Rgba8 = serde_json::from_value(json!([0.0, 0.0, 1.0, 0.0])).unwrap();
    assert_eq!(c, Rgba8::rgba(0, 0, 255, 0));
}

#[test]
fn rejects_garbage() {
    assert!(serde_json::from_value::<Rgba8>(json!("#12")).is_err());
    assert!(serde_json::from_value::<Rgba8>(json!([1.0, 2.0])).is_err());
}
