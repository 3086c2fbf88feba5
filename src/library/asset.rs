use serde::{Deserialize, Serialize};

use crate::foundation::core::TimestampMs;
use crate::foundation::token::token_enum;
use crate::raster::payload::ImagePayload;

/// Opaque asset identifier, unique within an [`crate::AssetStore`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an identifier from provenance data and a caller-chosen nonce.
    ///
    /// The same inputs always produce the same id; callers bump `nonce` on collision.
    pub fn derive(prompt: &str, timestamp: TimestampMs, nonce: u64) -> Self {
        let mut buf = Vec::with_capacity(prompt.len() + 16);
        buf.extend_from_slice(&timestamp.0.to_le_bytes());
        buf.extend_from_slice(&nonce.to_le_bytes());
        buf.extend_from_slice(prompt.as_bytes());
        Self(format!("{:016x}", xxhash_rust::xxh3::xxh3_64(&buf)))
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

token_enum! {
    /// What kind of game art an asset depicts.
    AssetType {
        /// A drag-racing vehicle.
        Car => "car",
        /// A track segment.
        Track => "track",
        /// A trackside prop (cone, barrier, flag).
        Prop => "prop",
        /// A user-interface element.
        Ui => "ui",
    }
}

token_enum! {
    /// Art style requested at generation time.
    ArtStyle {
        /// 16-bit pixel art.
        Pixel => "pixel",
        /// Flat vector illustration.
        Vector => "vector",
        /// Photorealistic render.
        Realistic => "realistic",
        /// Pencil sketch.
        Sketch => "sketch",
        /// Technical blueprint.
        Blueprint => "blueprint",
        /// Neon synthwave.
        Neon => "neon",
        /// Low-poly 3D look.
        LowPoly => "lowpoly",
        /// Cel-shaded cartoon.
        CelShaded => "celshaded",
        /// Vaporwave palette.
        Vaporwave => "vaporwave",
        /// Watercolor painting.
        Watercolor => "watercolor",
        /// Oil painting.
        Oil => "oil",
        /// Marker drawing.
        Marker => "marker",
    }
}

/// One generated image plus its provenance.
///
/// Only the image payload can change after creation (see
/// [`crate::AssetStore::replace_image`]); id, prompt, type, style and timestamp are fixed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    id: AssetId,
    #[serde(rename = "imageUrl")]
    image: ImagePayload,
    prompt: String,
    #[serde(rename = "type")]
    asset_type: AssetType,
    style: ArtStyle,
    timestamp: TimestampMs,
}

impl Asset {
    /// Assemble an asset record.
    pub fn new(
        id: AssetId,
        image: ImagePayload,
        prompt: impl Into<String>,
        asset_type: AssetType,
        style: ArtStyle,
        timestamp: TimestampMs,
    ) -> Self {
        Self {
            id,
            image,
            prompt: prompt.into(),
            asset_type,
            style,
            timestamp,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// Current image payload.
    pub fn image(&self) -> &ImagePayload {
        &self.image
    }

    /// Prompt text the asset was generated from.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Asset category.
    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// Art style.
    pub fn style(&self) -> ArtStyle {
        self.style
    }

    /// Creation time.
    pub fn timestamp(&self) -> TimestampMs {
        self.timestamp
    }

    /// File name offered when the asset is downloaded on its own.
    pub fn download_file_name(&self) -> String {
        format!("draggen-{}-{}.png", self.asset_type, self.id)
    }

    pub(crate) fn set_image(&mut self, image: ImagePayload) {
        self.image = image;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/library/asset.rs"]
mod tests;
