use crate::foundation::error::{DraggenError, DraggenResult};

/// Decoded raster in straight (non-premultiplied) RGBA8, row-major, tightly packed.
///
/// This is the platform-independent pixel type every pixel operation works on. Decoding and
/// encoding live in [`crate::ImagePayload`].
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba8: Vec<u8>,
}

impl RasterImage {
    /// Wrap an RGBA8 buffer. The buffer length must equal `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba8: Vec<u8>) -> DraggenResult<Self> {
        let expected = buffer_len(width, height)?;
        if rgba8.len() != expected {
            return Err(DraggenError::validation(format!(
                "rgba8 buffer has {} bytes, expected {expected} for {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }

    /// A raster where every pixel is `px`.
    pub fn filled(width: u32, height: u32, px: [u8; 4]) -> Self {
        let n = (width as usize) * (height as usize);
        Self {
            width,
            height,
            rgba8: px.repeat(n),
        }
    }

    /// A fully transparent raster.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Return `true` when the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Borrow the pixel bytes.
    pub fn as_rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    /// Take the pixel bytes.
    pub fn into_rgba8(self) -> Vec<u8> {
        self.rgba8
    }

    pub(crate) fn rgba8_mut(&mut self) -> &mut [u8] {
        &mut self.rgba8
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.rgba8[i],
            self.rgba8[i + 1],
            self.rgba8[i + 2],
            self.rgba8[i + 3],
        ])
    }

    /// Overwrite the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.rgba8[i..i + 4].copy_from_slice(&px);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Convert from an `image` buffer.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            rgba8: img.into_raw(),
        }
    }

    /// Convert into an `image` buffer.
    pub fn into_rgba_image(self) -> DraggenResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba8)
            .ok_or_else(|| DraggenError::encode("raster buffer does not match its dimensions"))
    }
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgba8_len", &self.rgba8.len())
            .finish()
    }
}

pub(crate) fn buffer_len(width: u32, height: u32) -> DraggenResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| DraggenError::validation("raster buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;
