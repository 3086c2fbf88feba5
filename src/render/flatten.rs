use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::foundation::core::{Affine, Point, Rect, TimestampMs, Vec2};
use crate::foundation::error::{DraggenError, DraggenResult};
use crate::foundation::math::{premultiply, sin_cos_deg, unpremultiply};
use crate::raster::buffer::{RasterImage, buffer_len};
use crate::raster::payload::ImagePayload;
use crate::render::blend::{PremulRgba8, composite};
use crate::render::bounds::{item_bounds, union_bounds};
use crate::scene::item::StageItem;

/// Margin added around the content on every side.
pub const EXPORT_PADDING: f64 = 50.0;
/// Smallest width and height of a flattened canvas.
pub const MIN_EXPORT_SIZE: u32 = 100;
/// Largest width or height of a flattened canvas.
pub const MAX_EXPORT_SIZE: u32 = 16_384;
/// Largest pixel count of a flattened canvas.
pub const MAX_EXPORT_PIXELS: u64 = 64 * 1024 * 1024;

/// Canvas sizing for [`flatten_items`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlattenOpts {
    /// Margin around the content, in stage units.
    pub padding: f64,
    /// Floor for both canvas dimensions.
    pub min_size: u32,
    /// Ceiling for either canvas dimension; larger content fails instead of allocating.
    pub max_size: u32,
    /// Ceiling for `width * height`.
    pub max_pixels: u64,
}

impl Default for FlattenOpts {
    fn default() -> Self {
        Self {
            padding: EXPORT_PADDING,
            min_size: MIN_EXPORT_SIZE,
            max_size: MAX_EXPORT_SIZE,
            max_pixels: MAX_EXPORT_PIXELS,
        }
    }
}

/// Result of flattening a stage.
#[derive(Clone, Debug, PartialEq)]
pub struct FlattenedImage {
    /// Straight-alpha pixels.
    pub raster: RasterImage,
    /// Stage coordinate of the canvas' top-left corner.
    pub origin: Point,
    /// Union of item bounds before padding, in stage coordinates.
    pub content_bounds: Rect,
}

impl FlattenedImage {
    /// Encode the canvas as PNG.
    pub fn encode_png(&self) -> DraggenResult<ImagePayload> {
        ImagePayload::encode_png(&self.raster)
    }

    /// Encode the canvas and name it after `timestamp`.
    pub fn export(&self, timestamp: TimestampMs) -> DraggenResult<ExportFile> {
        Ok(ExportFile {
            file_name: export_file_name(timestamp),
            png: self.encode_png()?,
        })
    }
}

/// An encoded export ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportFile {
    /// Suggested file name.
    pub file_name: String,
    /// PNG payload.
    pub png: ImagePayload,
}

impl ExportFile {
    /// Write the PNG into `dir` under [`ExportFile::file_name`], creating `dir` if needed.
    pub fn write_to_dir(&self, dir: &Path) -> DraggenResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create export dir '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, self.png.bytes())
            .with_context(|| format!("write export '{}'", path.display()))?;
        Ok(path)
    }
}

/// File name of a flattened export.
pub fn export_file_name(timestamp: TimestampMs) -> String {
    format!("draggen-assembly-{timestamp}.png")
}

struct Layer<'a> {
    item: &'a StageItem,
    pixels: RasterImage,
}

/// Rasterize `items` onto one transparent canvas, in `z_index` order with ties in slice order.
///
/// Every image is decoded before anything is painted, so one bad payload aborts the whole
/// export. Content whose padded canvas exceeds [`FlattenOpts::max_size`] or
/// [`FlattenOpts::max_pixels`] fails with [`DraggenError::Validation`] before the canvas is
/// allocated. An empty slice yields `Ok(None)`.
#[tracing::instrument(skip_all, fields(items = items.len()))]
pub fn flatten_items(
    items: &[StageItem],
    opts: &FlattenOpts,
) -> DraggenResult<Option<FlattenedImage>> {
    if items.is_empty() {
        return Ok(None);
    }

    let mut layers = items
        .iter()
        .map(|item| {
            Ok(Layer {
                item,
                pixels: item.image.decode()?,
            })
        })
        .collect::<DraggenResult<Vec<_>>>()?;

    let Some(content_bounds) = union_bounds(layers.iter().map(|l| {
        let (w, h) = l.pixels.dimensions();
        item_bounds(
            l.item.position,
            f64::from(w),
            f64::from(h),
            l.item.scale,
            l.item.rotation_deg,
        )
    })) else {
        return Ok(None);
    };

    let pad = opts.padding.max(0.0);
    let width = canvas_dim(content_bounds.width(), pad, opts)?;
    let height = canvas_dim(content_bounds.height(), pad, opts)?;
    if u64::from(width) * u64::from(height) > opts.max_pixels {
        return Err(DraggenError::validation(format!(
            "flattened canvas {width}x{height} exceeds {} pixels",
            opts.max_pixels
        )));
    }
    let origin = Point::new(content_bounds.x0 - pad, content_bounds.y0 - pad);

    // Stable: equal z keeps slice order.
    layers.sort_by_key(|l| l.item.z_index);

    let mut canvas = vec![0u8; buffer_len(width, height)?];
    for layer in &layers {
        paint_layer(&mut canvas, width, height, origin, layer);
    }

    let mut raster = RasterImage::new(width, height, canvas)?;
    for px in raster.rgba8_mut().chunks_exact_mut(4) {
        let out = unpremultiply([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&out);
    }

    tracing::debug!(width, height, "flattened stage");
    Ok(Some(FlattenedImage {
        raster,
        origin,
        content_bounds,
    }))
}

fn canvas_dim(extent: f64, pad: f64, opts: &FlattenOpts) -> DraggenResult<u32> {
    let raw = (extent + 2.0 * pad).ceil().max(f64::from(opts.min_size));
    if !raw.is_finite() || raw > f64::from(opts.max_size) {
        return Err(DraggenError::validation(format!(
            "flattened canvas side {raw} exceeds {} pixels",
            opts.max_size
        )));
    }
    Ok(raw as u32)
}

/// Source pixel space to canvas pixel space.
fn layer_transform(item: &StageItem, w: u32, h: u32, origin: Point) -> Affine {
    let (sin, cos) = sin_cos_deg(item.rotation_deg);
    Affine::translate(item.position - origin)
        * Affine::new([cos, sin, -sin, cos, 0.0, 0.0])
        * Affine::scale(item.scale)
        * Affine::translate(Vec2::new(-f64::from(w) / 2.0, -f64::from(h) / 2.0))
}

fn paint_layer(canvas: &mut [u8], width: u32, height: u32, origin: Point, layer: &Layer<'_>) {
    let (sw, sh) = layer.pixels.dimensions();
    if sw == 0 || sh == 0 || width == 0 {
        return;
    }
    let to_canvas = layer_transform(layer.item, sw, sh, origin);
    let to_source = to_canvas.inverse();
    let bbox =
        to_canvas.transform_rect_bbox(Rect::new(0.0, 0.0, f64::from(sw), f64::from(sh)));

    let x0 = bbox.x0.floor().max(0.0) as u32;
    let y0 = bbox.y0.floor().max(0.0) as u32;
    let x1 = (bbox.x1.ceil().max(0.0) as u32).min(width);
    let y1 = (bbox.y1.ceil().max(0.0) as u32).min(height);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let src = &layer.pixels;
    let mode = layer.item.blend_mode;
    let stride = width as usize * 4;
    canvas
        .par_chunks_exact_mut(stride)
        .enumerate()
        .skip(y0 as usize)
        .take((y1 - y0) as usize)
        .for_each(|(y, row)| {
            for x in x0..x1 {
                let p = to_source * Point::new(f64::from(x) + 0.5, f64::from(y as u32) + 0.5);
                let Some(sample) = sample_bilinear(src, p) else {
                    continue;
                };
                let i = x as usize * 4;
                let dst = [row[i], row[i + 1], row[i + 2], row[i + 3]];
                row[i..i + 4].copy_from_slice(&composite(dst, sample, mode));
            }
        });
}

/// Premultiplied bilinear sample at source position `p`, or `None` when `p` lies outside.
fn sample_bilinear(src: &RasterImage, p: Point) -> Option<PremulRgba8> {
    let (w, h) = src.dimensions();
    if !(p.x >= 0.0 && p.y >= 0.0 && p.x < f64::from(w) && p.y < f64::from(h)) {
        return None;
    }
    let fx = (p.x - 0.5).clamp(0.0, f64::from(w - 1));
    let fy = (p.y - 0.5).clamp(0.0, f64::from(h - 1));
    let ix = fx.floor() as u32;
    let iy = fy.floor() as u32;
    let tx = fx - f64::from(ix);
    let ty = fy - f64::from(iy);
    let ix1 = (ix + 1).min(w - 1);
    let iy1 = (iy + 1).min(h - 1);

    let fetch = |x: u32, y: u32| premultiply(src.pixel(x, y).unwrap_or([0, 0, 0, 0]));
    let (p00, p10, p01, p11) = (fetch(ix, iy), fetch(ix1, iy), fetch(ix, iy1), fetch(ix1, iy1));

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(p00[c]) * (1.0 - tx) + f64::from(p10[c]) * tx;
        let bottom = f64::from(p01[c]) * (1.0 - tx) + f64::from(p11[c]) * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    // Rounding can leave a color channel above alpha.
    for c in 0..3 {
        out[c] = out[c].min(out[3]);
    }
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/flatten.rs"]
mod tests;
