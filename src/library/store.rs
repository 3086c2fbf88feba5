use std::collections::HashSet;

use crate::foundation::error::{DraggenError, DraggenResult};
use crate::library::asset::{Asset, AssetId};
use crate::raster::payload::ImagePayload;

/// Ordered asset collection, most recent first.
///
/// The store is plain in-memory state; persistence is handled by [`crate::AssetRepository`] and
/// [`crate::AssetLibrary`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetStore {
    assets: Vec<Asset>,
}

impl AssetStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from assets already in display order.
    ///
    /// Later entries reusing an earlier id are dropped.
    pub fn from_assets(assets: Vec<Asset>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(assets.len());
        for asset in assets {
            if seen.insert(asset.id().clone()) {
                kept.push(asset);
            } else {
                tracing::warn!(id = %asset.id(), "dropping asset with duplicate id");
            }
        }
        Self { assets: kept }
    }

    /// Add `asset` at the front.
    pub fn append(&mut self, asset: Asset) -> DraggenResult<()> {
        if self.contains(asset.id()) {
            return Err(DraggenError::validation(format!(
                "asset id '{}' already exists",
                asset.id()
            )));
        }
        self.assets.insert(0, asset);
        Ok(())
    }

    /// Remove the asset with `id`. Absent ids are a no-op returning `None`.
    pub fn remove(&mut self, id: &AssetId) -> Option<Asset> {
        let idx = self.assets.iter().position(|a| a.id() == id)?;
        Some(self.assets.remove(idx))
    }

    /// Swap the image payload of `id`, keeping identity and metadata.
    ///
    /// Returns `false` (and changes nothing) when `id` is absent.
    pub fn replace_image(&mut self, id: &AssetId, image: ImagePayload) -> bool {
        match self.assets.iter_mut().find(|a| a.id() == id) {
            Some(asset) => {
                asset.set_image(image);
                true
            }
            None => false,
        }
    }

    /// Look up an asset.
    pub fn get(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id() == id)
    }

    /// Return `true` when `id` is present.
    pub fn contains(&self, id: &AssetId) -> bool {
        self.get(id).is_some()
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Return `true` when the store holds no assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Iterate in display order (most recent first).
    pub fn iter(&self) -> std::slice::Iter<'_, Asset> {
        self.assets.iter()
    }

    /// Borrow the assets in display order.
    pub fn as_slice(&self) -> &[Asset] {
        &self.assets
    }

    /// Serialize the whole collection as a JSON array.
    pub fn to_json(&self) -> DraggenResult<String> {
        serde_json::to_string(&self.assets)
            .map_err(|e| DraggenError::persistence(format!("serialize asset store: {e}")))
    }

    /// Parse a JSON array written by [`AssetStore::to_json`].
    pub fn from_json(json: &str) -> DraggenResult<Self> {
        let assets: Vec<Asset> = serde_json::from_str(json)
            .map_err(|e| DraggenError::persistence(format!("parse asset store JSON: {e}")))?;
        Ok(Self::from_assets(assets))
    }
}

impl<'a> IntoIterator for &'a AssetStore {
    type Item = &'a Asset;
    type IntoIter = std::slice::Iter<'a, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/library/store.rs"]
mod tests;
