use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{DraggenError, DraggenResult};
use crate::library::asset::{AssetId, AssetType};
use crate::raster::payload::ImagePayload;

/// Identifier of an item on a [`crate::Stage`], unique per stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageItemId(pub u64);

impl std::fmt::Display for StageItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// How an item's pixels combine with what is already painted beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Source-over.
    #[default]
    Normal,
    /// `1 - (1 - b)(1 - s)`.
    Screen,
    /// `b * s`.
    Multiply,
    /// Multiply or screen depending on the backdrop.
    Overlay,
}

impl BlendMode {
    /// Order used by [`BlendMode::next`].
    pub const CYCLE: [BlendMode; 4] = [
        BlendMode::Normal,
        BlendMode::Screen,
        BlendMode::Multiply,
        BlendMode::Overlay,
    ];

    /// The mode after `self` in [`BlendMode::CYCLE`], wrapping around.
    pub fn next(self) -> Self {
        match self {
            BlendMode::Normal => BlendMode::Screen,
            BlendMode::Screen => BlendMode::Multiply,
            BlendMode::Multiply => BlendMode::Overlay,
            BlendMode::Overlay => BlendMode::Normal,
        }
    }

    /// Lowercase token.
    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Screen => "screen",
            BlendMode::Multiply => "multiply",
            BlendMode::Overlay => "overlay",
        }
    }
}

impl FromStr for BlendMode {
    type Err = DraggenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::CYCLE
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| DraggenError::validation(format!("unknown blend mode \"{s}\"")))
    }
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One placed image on the stage.
///
/// `image` is a copy of the source asset's payload taken when the item was added; later changes
/// to the asset do not reach the item.
#[derive(Clone, Debug, PartialEq)]
pub struct StageItem {
    /// Stage-local identifier.
    pub id: StageItemId,
    /// Asset the image was copied from.
    pub asset_id: AssetId,
    /// Category of the source asset.
    pub asset_type: AssetType,
    /// Image copy.
    pub image: ImagePayload,
    /// Center of the item in stage coordinates.
    pub position: Point,
    /// Uniform scale, always positive.
    pub scale: f64,
    /// Clockwise rotation in degrees; any range.
    pub rotation_deg: f64,
    /// Paint order key, lower first.
    pub z_index: i64,
    /// Compositing mode.
    pub blend_mode: BlendMode,
}

/// Partial update of a [`StageItem`]. Unset fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemPatch {
    /// New center.
    pub position: Option<Point>,
    /// Offset added to the center (applied after `position`).
    pub translate: Option<Vec2>,
    /// New scale.
    pub scale: Option<f64>,
    /// New rotation in degrees.
    pub rotation_deg: Option<f64>,
    /// New paint order key.
    pub z_index: Option<i64>,
    /// New blend mode.
    pub blend_mode: Option<BlendMode>,
    /// New image payload.
    pub image: Option<ImagePayload>,
}

impl ItemPatch {
    /// Set the center.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Move the center by `delta`.
    pub fn with_translate(mut self, delta: Vec2) -> Self {
        self.translate = Some(delta);
        self
    }

    /// Set the scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set the rotation.
    pub fn with_rotation_deg(mut self, deg: f64) -> Self {
        self.rotation_deg = Some(deg);
        self
    }

    /// Set the paint order key.
    pub fn with_z_index(mut self, z: i64) -> Self {
        self.z_index = Some(z);
        self
    }

    /// Set the blend mode.
    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = Some(mode);
        self
    }

    /// Replace the image copy.
    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    /// Return `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn validate(&self) -> DraggenResult<()> {
        if let Some(p) = self.position {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(DraggenError::validation("position must be finite"));
            }
        }
        if let Some(d) = self.translate {
            if !(d.x.is_finite() && d.y.is_finite()) {
                return Err(DraggenError::validation("translation must be finite"));
            }
        }
        if let Some(s) = self.scale {
            if !s.is_finite() || s <= 0.0 {
                return Err(DraggenError::validation(format!(
                    "scale must be finite and > 0, got {s}"
                )));
            }
        }
        if let Some(r) = self.rotation_deg {
            if !r.is_finite() {
                return Err(DraggenError::validation("rotation must be finite"));
            }
        }
        Ok(())
    }

    pub(crate) fn apply_to(self, item: &mut StageItem) {
        if let Some(p) = self.position {
            item.position = p;
        }
        if let Some(d) = self.translate {
            item.position += d;
        }
        if let Some(s) = self.scale {
            item.scale = s;
        }
        if let Some(r) = self.rotation_deg {
            item.rotation_deg = r;
        }
        if let Some(z) = self.z_index {
            item.z_index = z;
        }
        if let Some(m) = self.blend_mode {
            item.blend_mode = m;
        }
        if let Some(img) = self.image {
            item.image = img;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/item.rs"]
mod tests;
