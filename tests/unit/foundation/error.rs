use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DraggenError::generation("x")
            .to_string()
            .contains("generation error:")
    );
    assert!(DraggenError::decode("x").to_string().contains("decode error:"));
    assert!(
        DraggenError::persistence("x")
            .to_string()
            .contains("persistence error:")
    );
    assert!(
        DraggenError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(DraggenError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DraggenError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
