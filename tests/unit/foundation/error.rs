use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ClipweaveError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ClipweaveError::animation("x")
            .to_string()
            .contains("animation error:")
    );
    assert!(
        ClipweaveError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        ClipweaveError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        ClipweaveError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        ClipweaveError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ClipweaveError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_convert() {
    let err: ClipweaveError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, ClipweaveError::Serde(_)));
}
