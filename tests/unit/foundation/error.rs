use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CollageError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CollageError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        CollageError::export("x")
            .to_string()
            .contains("export error:")
    );
    assert!(
        CollageError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CollageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_map_to_serde_variant() {
    let err: CollageError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, CollageError::Serde(_)));
}
