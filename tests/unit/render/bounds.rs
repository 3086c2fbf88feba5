use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn unrotated_item_bounds_are_exact() {
    for (w, h, s, x, y) in [
        (200.0, 100.0, 1.0, 400.0, 300.0),
        (100.0, 100.0, 2.0, 500.0, 300.0),
        (37.0, 11.0, 0.3, -12.5, 7.25),
    ] {
        let r = item_bounds(Point::new(x, y), w, h, s, 0.0);
        assert_eq!(r.x0, x - s * w / 2.0);
        assert_eq!(r.x1, x + s * w / 2.0);
        assert_eq!(r.y0, y - s * h / 2.0);
        assert_eq!(r.y1, y + s * h / 2.0);
    }
}

#[test]
fn quarter_turn_swaps_extent() {
    let size = rotated_extent(200.0, 100.0, 1.0, 90.0);
    assert!(close(size.width, 100.0));
    assert!(close(size.height, 200.0));

    let size = rotated_extent(200.0, 100.0, 1.0, -270.0);
    assert!(close(size.width, 100.0));
}

#[test]
fn diagonal_rotation_grows_extent() {
    let size = rotated_extent(100.0, 100.0, 1.0, 45.0);
    let diag = 100.0 * std::f64::consts::SQRT_2;
    assert!(close(size.width, diag));
    assert!(close(size.height, diag));
}

#[test]
fn union_covers_all_inputs() {
    assert!(union_bounds(std::iter::empty()).is_none());
    let u = union_bounds([
        Rect::new(300.0, 250.0, 500.0, 350.0),
        Rect::new(400.0, 200.0, 600.0, 400.0),
    ])
    .unwrap();
    assert_eq!(u, Rect::new(300.0, 200.0, 600.0, 400.0));
}
