use rayon::prelude::*;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{DraggenError, DraggenResult};
use crate::raster::buffer::RasterImage;
use crate::raster::payload::ImagePayload;

/// Default hard-cutoff distance.
pub const DEFAULT_TOLERANCE: f64 = 40.0;
/// Default width of the soft ramp band above the cutoff.
pub const DEFAULT_SOFTNESS: f64 = 15.0;

/// Distance band that decides what happens to each pixel.
///
/// With `d` the RGB distance to the reference color:
///
/// - `d < tolerance`: alpha becomes 0.
/// - `tolerance <= d < tolerance + softness`: alpha becomes
///   `min(alpha, 255 * (d - tolerance) / softness)`.
/// - otherwise the pixel is untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyBand {
    /// Hard cutoff distance.
    pub tolerance: f64,
    /// Width of the linear ramp band. `0` gives a hard edge.
    pub softness: f64,
    /// Scale RGB by the ramp ratio inside the band when the reference is near-black.
    pub defringe: bool,
}

impl Default for KeyBand {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            softness: DEFAULT_SOFTNESS,
            defringe: true,
        }
    }
}

impl KeyBand {
    fn validate(&self) -> DraggenResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(DraggenError::validation(
                "chroma key tolerance must be finite and >= 0",
            ));
        }
        if !self.softness.is_finite() || self.softness < 0.0 {
            return Err(DraggenError::validation(
                "chroma key softness must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Where the reference (background) color comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ReferenceColor {
    /// Pixel (0, 0). Relies on the generator producing a flat background.
    #[default]
    TopLeft,
    /// A caller-chosen color.
    Explicit(Rgb8),
    /// Pixel (0, 0), but only if the other three corners lie within `max_distance` of it.
    ///
    /// Disagreeing corners are an error; they are never averaged.
    CornersAgree {
        /// Largest accepted RGB distance between a corner and the top-left pixel.
        max_distance: f64,
    },
}

/// Full chroma-key configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChromaKeyOpts {
    /// Distance band.
    pub band: KeyBand,
    /// Reference color source.
    pub reference: ReferenceColor,
}

/// The four corner colors in order top-left, top-right, bottom-left, bottom-right.
///
/// Returns `None` for an empty raster.
pub fn sample_corners(image: &RasterImage) -> Option<[Rgb8; 4]> {
    if image.is_empty() {
        return None;
    }
    let (w, h) = image.dimensions();
    let at = |x: u32, y: u32| image.pixel(x, y).map(Rgb8::from_rgba);
    Some([at(0, 0)?, at(w - 1, 0)?, at(0, h - 1)?, at(w - 1, h - 1)?])
}

/// Resolve the reference color for `image`. Returns `None` for an empty raster.
pub fn resolve_reference(
    image: &RasterImage,
    source: ReferenceColor,
) -> DraggenResult<Option<Rgb8>> {
    match source {
        ReferenceColor::Explicit(c) => Ok(Some(c)),
        ReferenceColor::TopLeft => Ok(image.pixel(0, 0).map(Rgb8::from_rgba)),
        ReferenceColor::CornersAgree { max_distance } => {
            let Some(corners) = sample_corners(image) else {
                return Ok(None);
            };
            let reference = corners[0];
            if let Some(off) = corners[1..]
                .iter()
                .find(|c| c.distance(reference) > max_distance)
            {
                return Err(DraggenError::validation(format!(
                    "image corners disagree on the background color ({} vs {})",
                    reference.to_hex(),
                    off.to_hex()
                )));
            }
            Ok(Some(reference))
        }
    }
}

/// Remove the background of `image` against `reference`, returning a new raster.
///
/// The input is never modified. Every pixel is handled independently, so the pass runs in
/// parallel over pixels and stays deterministic.
pub fn extract_alpha(image: &RasterImage, reference: Rgb8, band: KeyBand) -> RasterImage {
    let mut out = image.clone();
    let defringe = band.defringe && reference.is_near_black();
    out.rgba8_mut()
        .par_chunks_exact_mut(4)
        .for_each(|px| key_pixel(px, reference, band, defringe));
    out
}

fn key_pixel(px: &mut [u8], reference: Rgb8, band: KeyBand, defringe: bool) {
    let d = Rgb8::new(px[0], px[1], px[2]).distance(reference);
    if d < band.tolerance {
        px[3] = 0;
        return;
    }
    // `d >= tolerance` here, so a pixel can only be inside the band when softness > 0.
    if d >= band.tolerance + band.softness {
        return;
    }

    let ratio = ((d - band.tolerance) / band.softness).clamp(0.0, 1.0);
    let ramp = (255.0 * ratio).round() as u8;
    px[3] = px[3].min(ramp);
    if defringe {
        for c in &mut px[..3] {
            *c = (f64::from(*c) * ratio).round() as u8;
        }
    }
}

/// Resolve the reference color from `opts` and key `image`.
///
/// An empty raster is returned unchanged.
#[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn chroma_key(image: &RasterImage, opts: &ChromaKeyOpts) -> DraggenResult<RasterImage> {
    opts.band.validate()?;
    let Some(reference) = resolve_reference(image, opts.reference)? else {
        return Ok(image.clone());
    };
    tracing::debug!(reference = %reference.to_hex(), "keying raster");
    Ok(extract_alpha(image, reference, opts.band))
}

/// Decode `payload`, key it and re-encode it as PNG.
///
/// Fails with [`DraggenError::Decode`] when the payload cannot be decoded; the caller's payload is
/// left as it was.
pub fn key_payload(payload: &ImagePayload, opts: &ChromaKeyOpts) -> DraggenResult<ImagePayload> {
    let raster = payload.decode()?;
    if raster.is_empty() {
        return Ok(payload.clone());
    }
    let keyed = chroma_key(&raster, opts)?;
    ImagePayload::encode_png(&keyed)
}

#[cfg(test)]
#[path = "../../tests/unit/chroma/key.rs"]
mod tests;
