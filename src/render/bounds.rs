use kurbo::Size;

use crate::foundation::core::{Point, Rect};
use crate::foundation::math::sin_cos_deg;

/// Size of the axis-aligned box enclosing a `width` x `height` image scaled by `scale` and
/// rotated by `rotation_deg` around its center.
pub fn rotated_extent(width: f64, height: f64, scale: f64, rotation_deg: f64) -> Size {
    let w = width * scale;
    let h = height * scale;
    let (sin, cos) = sin_cos_deg(rotation_deg);
    Size::new(
        (w * cos).abs() + (h * sin).abs(),
        (w * sin).abs() + (h * cos).abs(),
    )
}

/// Axis-aligned stage-space bounds of one placed image.
pub fn item_bounds(center: Point, width: f64, height: f64, scale: f64, rotation_deg: f64) -> Rect {
    let size = rotated_extent(width, height, scale, rotation_deg);
    let (hw, hh) = (size.width / 2.0, size.height / 2.0);
    Rect::new(center.x - hw, center.y - hh, center.x + hw, center.y + hh)
}

/// Smallest rectangle containing every input, or `None` for no inputs.
pub fn union_bounds(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

#[cfg(test)]
#[path = "../../tests/unit/render/bounds.rs"]
mod tests;
