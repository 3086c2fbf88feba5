use super::*;
use crate::foundation::core::TimestampMs;
use crate::library::asset::{ArtStyle, AssetId};
use crate::raster::buffer::RasterImage;
use crate::raster::payload::ImagePayload;

fn asset(id: &str, ty: AssetType) -> Asset {
    let img = RasterImage::filled(2, 2, [255, 255, 255, 255]);
    Asset::new(
        AssetId::new(id),
        ImagePayload::encode_png(&img).unwrap(),
        "p",
        ty,
        ArtStyle::Pixel,
        TimestampMs(0),
    )
}

fn stage_with(n: usize) -> (Stage, Vec<StageItemId>) {
    let mut stage = Stage::new();
    let ids = (0..n)
        .map(|i| stage.add_item(&asset(&format!("a{i}"), AssetType::Prop)))
        .collect();
    (stage, ids)
}

#[test]
fn add_item_uses_defaults_and_selects() {
    let mut stage = Stage::new();
    let car = stage.add_item(&asset("c", AssetType::Car));
    let prop = stage.add_item(&asset("p", AssetType::Prop));

    let car = stage.get(car).unwrap();
    assert_eq!(car.position, DEFAULT_PLACEMENT);
    assert_eq!(car.scale, 1.5);
    assert_eq!(car.z_index, 1);
    assert_eq!(car.blend_mode, BlendMode::Normal);

    let p = stage.get(prop).unwrap();
    assert_eq!(p.scale, 1.0);
    assert_eq!(p.z_index, 2);
    assert_eq!(stage.selection().ids(), [prop]);
}

#[test]
fn item_image_is_a_copy_of_the_asset() {
    let mut stage = Stage::new();
    let src = asset("a", AssetType::Track);
    let id = stage.add_item(&src);
    assert_eq!(stage.get(id).unwrap().image, *src.image());
    assert_eq!(stage.get(id).unwrap().asset_id, *src.id());
}

#[test]
fn exclusive_click_selects_exactly_one_item() {
    let (mut stage, ids) = stage_with(3);
    stage.pointer_down_on_item(ids[0], Point::ZERO, false);
    stage.pointer_up();
    stage.pointer_down_on_item(ids[2], Point::ZERO, true);
    stage.pointer_up();
    assert_eq!(stage.selection().len(), 2);

    stage.pointer_down_on_item(ids[1], Point::ZERO, false);
    assert_eq!(stage.selection().ids(), [ids[1]]);
}

#[test]
fn click_on_selected_item_keeps_group() {
    let (mut stage, ids) = stage_with(2);
    stage.pointer_down_on_item(ids[0], Point::ZERO, true);
    assert_eq!(stage.selection().len(), 2);
    stage.pointer_up();
    stage.pointer_down_on_item(ids[0], Point::ZERO, false);
    assert_eq!(stage.selection().len(), 2);
}

#[test]
fn additive_click_toggles() {
    let (mut stage, ids) = stage_with(2);
    stage.pointer_down_on_item(ids[1], Point::ZERO, true);
    assert!(stage.selection().is_empty());
    stage.pointer_down_on_item(ids[1], Point::ZERO, true);
    assert_eq!(stage.selection().ids(), [ids[1]]);
}

#[test]
fn click_on_empty_stage_clears_selection() {
    let (mut stage, _) = stage_with(2);
    assert!(!stage.selection().is_empty());
    stage.pointer_down_on_stage();
    assert!(stage.selection().is_empty());
    assert_eq!(stage.drag_state(), DragState::Idle);
}

#[test]
fn drag_moves_selection_by_zoom_adjusted_delta() {
    let (mut stage, ids) = stage_with(3);
    stage.pointer_down_on_item(ids[0], Point::new(10.0, 10.0), false);
    stage.pointer_down_on_item(ids[1], Point::new(10.0, 10.0), true);
    stage.set_view_zoom(2.0).unwrap();

    assert!(stage.pointer_move(Point::new(30.0, 50.0)));
    assert!(stage.pointer_move(Point::new(40.0, 50.0)));
    stage.pointer_up();
    assert!(!stage.pointer_move(Point::new(100.0, 100.0)));

    assert_eq!(stage.get(ids[0]).unwrap().position, Point::new(415.0, 320.0));
    assert_eq!(stage.get(ids[1]).unwrap().position, Point::new(415.0, 320.0));
    assert_eq!(stage.get(ids[2]).unwrap().position, DEFAULT_PLACEMENT);
    assert_eq!(stage.selection().len(), 2);
}

#[test]
fn view_zoom_must_be_positive() {
    let mut stage = Stage::new();
    assert!(stage.set_view_zoom(0.0).is_err());
    assert!(stage.set_view_zoom(f64::NAN).is_err());
    assert_eq!(stage.view_zoom(), 1.0);
}

#[test]
fn paint_order_is_stable_for_equal_z() {
    let (mut stage, ids) = stage_with(4);
    stage
        .update_items(&ids, ItemPatch::default().with_z_index(5))
        .unwrap();
    let order: Vec<_> = stage.paint_order().iter().map(|it| it.id).collect();
    assert_eq!(order, ids);

    stage.reorder(&[ids[3]], ZOrder::Back);
    stage.reorder(&[ids[0]], ZOrder::Front);
    let order: Vec<_> = stage.paint_order().iter().map(|it| it.id).collect();
    assert_eq!(order, [ids[3], ids[1], ids[2], ids[0]]);
}

#[test]
fn front_reorder_lifts_a_tied_item_over_its_twin() {
    let colors = [
        [255, 0, 0, 255],
        [0, 255, 0, 255],
        [0, 0, 255, 255],
        [255, 255, 0, 255],
    ];
    let mut stage = Stage::new();
    let ids: Vec<_> = colors
        .iter()
        .enumerate()
        .map(|(i, px)| {
            let img = ImagePayload::encode_png(&RasterImage::filled(2, 2, *px)).unwrap();
            let src = Asset::new(
                AssetId::new(format!("c{i}")),
                img,
                "p",
                AssetType::Prop,
                ArtStyle::Pixel,
                TimestampMs(0),
            );
            stage.add_item(&src)
        })
        .collect();
    for (id, z) in ids.iter().zip([3, 1, 3, 2]) {
        stage
            .update_items(&[*id], ItemPatch::default().with_z_index(z))
            .unwrap();
    }

    let order: Vec<_> = stage.paint_order().iter().map(|it| it.id).collect();
    assert_eq!(order, [ids[1], ids[3], ids[0], ids[2]]);
    let flat = stage.flatten(&FlattenOpts::default()).unwrap().unwrap();
    assert_eq!(flat.raster.pixel(51, 51), Some(colors[2]));

    assert_eq!(stage.reorder(&[ids[0]], ZOrder::Front), 1);
    assert_eq!(stage.get(ids[0]).unwrap().z_index, 4);
    let order: Vec<_> = stage.paint_order().iter().map(|it| it.id).collect();
    assert_eq!(order, [ids[1], ids[3], ids[2], ids[0]]);
    let flat = stage.flatten(&FlattenOpts::default()).unwrap().unwrap();
    assert_eq!(flat.raster.dimensions(), (102, 102));
    assert_eq!(flat.raster.pixel(51, 51), Some(colors[0]));
}

#[test]
fn reorder_assigns_shared_extreme() {
    let (mut stage, ids) = stage_with(4);
    assert_eq!(stage.reorder(&[ids[0], ids[1]], ZOrder::Front), 2);
    assert_eq!(stage.get(ids[0]).unwrap().z_index, 5);
    assert_eq!(stage.get(ids[1]).unwrap().z_index, 5);
    // Remaining z values are 5, 5, 3, 4.
    stage.reorder(&[ids[2]], ZOrder::Back);
    assert_eq!(stage.get(ids[2]).unwrap().z_index, 2);
    assert_eq!(stage.reorder(&[], ZOrder::Front), 0);
}

#[test]
fn duplicate_is_independent_of_source() {
    let (mut stage, ids) = stage_with(2);
    let clones = stage.duplicate(&[ids[0], ids[1]]);
    assert_eq!(clones.len(), 2);
    assert_eq!(stage.selection().ids(), clones);

    let c0 = stage.get(clones[0]).unwrap().clone();
    assert_eq!(c0.position, DEFAULT_PLACEMENT + DUPLICATE_OFFSET);
    assert_eq!(c0.z_index, 3);
    assert_eq!(stage.get(clones[1]).unwrap().z_index, 4);

    stage
        .update_items(&[clones[0]], ItemPatch::default().with_scale(3.0))
        .unwrap();
    assert_eq!(stage.get(ids[0]).unwrap().scale, 1.0);

    stage.delete(&[clones[0]]);
    assert!(stage.get(ids[0]).is_some());
    assert_eq!(stage.len(), 3);
}

#[test]
fn duplicate_of_nothing_is_noop() {
    let (mut stage, ids) = stage_with(1);
    assert!(stage.duplicate(&[]).is_empty());
    assert_eq!(stage.selection().ids(), ids);
    assert_eq!(stage.len(), 1);
}

#[test]
fn delete_drops_from_selection() {
    let (mut stage, ids) = stage_with(3);
    stage.pointer_down_on_item(ids[0], Point::ZERO, true);
    assert_eq!(stage.delete_selected(), 2);
    assert_eq!(stage.len(), 1);
    assert!(stage.selection().is_empty());
    assert_eq!(stage.delete(&[StageItemId(999)]), 0);
}

#[test]
fn update_with_invalid_patch_changes_nothing() {
    let (mut stage, ids) = stage_with(2);
    let err = stage
        .update_items_with(&ids, |it| {
            if it.id == ids[1] {
                ItemPatch::default().with_scale(-1.0)
            } else {
                ItemPatch::default().with_scale(2.0)
            }
        })
        .unwrap_err();
    assert!(matches!(err, DraggenError::Validation(_)));
    assert_eq!(stage.get(ids[0]).unwrap().scale, 1.0);
}

#[test]
fn scale_and_rotate_selected() {
    let (mut stage, ids) = stage_with(2);
    assert_eq!(stage.scale_selected(-5.0).unwrap(), 1);
    assert_eq!(stage.get(ids[1]).unwrap().scale, MIN_SCALE);
    assert_eq!(stage.get(ids[0]).unwrap().scale, 1.0);

    stage.rotate_selected(45.0).unwrap();
    stage.rotate_selected(45.0).unwrap();
    assert_eq!(stage.get(ids[1]).unwrap().rotation_deg, 90.0);
}

#[test]
fn blend_cycle_on_single_selection_only() {
    let (mut stage, ids) = stage_with(2);
    assert_eq!(stage.cycle_selected_blend_mode(), Some(BlendMode::Screen));
    stage.pointer_down_on_item(ids[0], Point::ZERO, true);
    assert_eq!(stage.cycle_selected_blend_mode(), None);
    assert_eq!(stage.cycle_blend_mode(&ids), 2);
    assert_eq!(stage.get(ids[0]).unwrap().blend_mode, BlendMode::Screen);
    assert_eq!(stage.get(ids[1]).unwrap().blend_mode, BlendMode::Multiply);
}

#[test]
fn key_items_is_all_or_nothing() {
    let (mut stage, ids) = stage_with(2);
    let broken = ImagePayload::png(vec![1, 2, 3]);
    stage
        .update_items(&[ids[1]], ItemPatch::default().with_image(broken.clone()))
        .unwrap();
    let before = stage.get(ids[0]).unwrap().image.clone();

    let err = stage.key_items(&ids, &ChromaKeyOpts::default()).unwrap_err();
    assert!(matches!(err, DraggenError::Decode(_)));
    assert_eq!(stage.get(ids[0]).unwrap().image, before);

    assert_eq!(stage.key_items(&[ids[0]], &ChromaKeyOpts::default()).unwrap(), 1);
    let keyed = stage.get(ids[0]).unwrap().image.decode().unwrap();
    assert_eq!(keyed.pixel(0, 0).unwrap()[3], 0);
}

#[test]
fn empty_stage_flattens_to_none() {
    assert!(Stage::new().flatten(&FlattenOpts::default()).unwrap().is_none());
}
