use std::io::Cursor;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::foundation::error::{DraggenError, DraggenResult};
use crate::raster::buffer::RasterImage;

/// MIME type written for every re-encoded payload.
pub const PNG_MIME: &str = "image/png";

/// Self-contained encoded image: MIME type plus the encoded bytes.
///
/// Serialized as a `data:<mime>;base64,<data>` URI string. Cloning shares the byte buffer; the
/// bytes are immutable, so replacing a payload never affects other clones.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    bytes: Arc<Vec<u8>>,
}

impl ImagePayload {
    /// Wrap encoded bytes with their MIME type.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Wrap PNG-encoded bytes.
    pub fn png(bytes: Vec<u8>) -> Self {
        Self::new(PNG_MIME, bytes)
    }

    /// Build a payload from base64 data as returned by the generation API.
    pub fn from_base64(mime_type: impl Into<String>, data: &str) -> DraggenResult<Self> {
        let bytes = BASE64
            .decode(data.trim())
            .map_err(|e| DraggenError::decode(format!("invalid base64 image data: {e}")))?;
        Ok(Self::new(mime_type, bytes))
    }

    /// Parse a `data:<mime>;base64,<data>` URI.
    pub fn from_data_uri(uri: &str) -> DraggenResult<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| DraggenError::decode("image payload is not a data: URI"))?;
        let (meta, data) = rest
            .split_once(',')
            .ok_or_else(|| DraggenError::decode("data: URI has no ',' separator"))?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| DraggenError::decode("data: URI must be base64-encoded"))?;
        if mime_type.is_empty() {
            return Err(DraggenError::decode("data: URI has an empty MIME type"));
        }
        Self::from_base64(mime_type, data)
    }

    /// Format as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(self.bytes.as_slice()))
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode into a straight-alpha raster.
    pub fn decode(&self) -> DraggenResult<RasterImage> {
        let dyn_img = image::load_from_memory(&self.bytes).map_err(|e| {
            DraggenError::decode(format!("decode {} payload: {e}", self.mime_type))
        })?;
        Ok(RasterImage::from_rgba_image(dyn_img.to_rgba8()))
    }

    /// Encode a raster as PNG.
    pub fn encode_png(raster: &RasterImage) -> DraggenResult<Self> {
        if raster.is_empty() {
            return Err(DraggenError::encode("cannot encode an empty raster as PNG"));
        }
        let img = raster.clone().into_rgba_image()?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| DraggenError::encode(format!("write png: {e}")))?;
        Ok(Self::png(buf))
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl serde::Serialize for ImagePayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_data_uri())
    }
}

impl<'de> serde::Deserialize<'de> for ImagePayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_data_uri(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/payload.rs"]
mod tests;
