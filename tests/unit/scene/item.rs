use super::*;

fn item() -> StageItem {
    StageItem {
        id: StageItemId(1),
        asset_id: AssetId::new("a"),
        asset_type: AssetType::Prop,
        image: ImagePayload::png(vec![1, 2, 3]),
        position: Point::new(10.0, 20.0),
        scale: 1.0,
        rotation_deg: 0.0,
        z_index: 1,
        blend_mode: BlendMode::Normal,
    }
}

#[test]
fn blend_cycle_wraps() {
    let mut m = BlendMode::default();
    let mut seen = Vec::new();
    for _ in 0..5 {
        seen.push(m);
        m = m.next();
    }
    assert_eq!(
        seen,
        [
            BlendMode::Normal,
            BlendMode::Screen,
            BlendMode::Multiply,
            BlendMode::Overlay,
            BlendMode::Normal
        ]
    );
}

#[test]
fn blend_mode_parses_and_serializes_lowercase() {
    assert_eq!("Screen".parse::<BlendMode>().unwrap(), BlendMode::Screen);
    assert!("dodge".parse::<BlendMode>().is_err());
    assert_eq!(
        serde_json::to_string(&BlendMode::Multiply).unwrap(),
        "\"multiply\""
    );
}

#[test]
fn patch_touches_only_set_fields() {
    let mut it = item();
    ItemPatch::default()
        .with_scale(2.5)
        .with_translate(Vec2::new(5.0, -5.0))
        .apply_to(&mut it);
    assert_eq!(it.scale, 2.5);
    assert_eq!(it.position, Point::new(15.0, 15.0));
    assert_eq!(it.rotation_deg, 0.0);
    assert_eq!(it.z_index, 1);
    assert_eq!(it.image, ImagePayload::png(vec![1, 2, 3]));
}

#[test]
fn patch_validation() {
    assert!(ItemPatch::default().validate().is_ok());
    assert!(ItemPatch::default().is_empty());
    assert!(ItemPatch::default().with_scale(0.0).validate().is_err());
    assert!(ItemPatch::default().with_scale(f64::NAN).validate().is_err());
    assert!(ItemPatch::default()
        .with_rotation_deg(f64::INFINITY)
        .validate()
        .is_err());
    assert!(ItemPatch::default()
        .with_position(Point::new(f64::NAN, 0.0))
        .validate()
        .is_err());
}

#[test]
fn item_id_display() {
    assert_eq!(StageItemId(7).to_string(), "item-7");
}
