use crate::chroma::key::{ChromaKeyOpts, key_payload};
use crate::foundation::core::TimestampMs;
use crate::foundation::error::DraggenResult;
use crate::library::asset::{ArtStyle, Asset, AssetId, AssetType};
use crate::library::repository::{AssetRepository, KeyValueSlot};
use crate::library::store::AssetStore;
use crate::raster::payload::ImagePayload;

/// An [`AssetStore`] bound to its repository; every mutation is saved before returning.
///
/// A mutation is applied to a copy of the store and only becomes visible once the save
/// succeeds, so a failed save leaves memory matching what was last persisted.
#[derive(Debug)]
pub struct AssetLibrary<S: KeyValueSlot> {
    store: AssetStore,
    repo: AssetRepository<S>,
}

impl<S: KeyValueSlot> AssetLibrary<S> {
    /// Load the collection from `repo`. Unreadable data yields an empty library.
    pub fn open(repo: AssetRepository<S>) -> Self {
        let store = repo.load();
        Self { store, repo }
    }

    /// Current in-memory collection.
    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Backing repository.
    pub fn repository(&self) -> &AssetRepository<S> {
        &self.repo
    }

    /// Look up an asset.
    pub fn get(&self, id: &AssetId) -> Option<&Asset> {
        self.store.get(id)
    }

    /// Create an asset with a fresh id derived from its provenance and append it.
    pub fn create(
        &mut self,
        image: ImagePayload,
        prompt: impl Into<String>,
        asset_type: AssetType,
        style: ArtStyle,
        timestamp: TimestampMs,
    ) -> DraggenResult<AssetId> {
        let prompt = prompt.into();
        let mut nonce = 0u64;
        let id = loop {
            let candidate = AssetId::derive(&prompt, timestamp, nonce);
            if !self.store.contains(&candidate) {
                break candidate;
            }
            nonce += 1;
        };
        self.append(Asset::new(
            id.clone(),
            image,
            prompt,
            asset_type,
            style,
            timestamp,
        ))?;
        Ok(id)
    }

    /// Append a fully-formed asset at the front.
    #[tracing::instrument(skip_all, fields(id = %asset.id()))]
    pub fn append(&mut self, asset: Asset) -> DraggenResult<()> {
        self.commit(|store| store.append(asset).map(Some))?;
        Ok(())
    }

    /// Remove `id`; absent ids change nothing and skip the save.
    pub fn remove(&mut self, id: &AssetId) -> DraggenResult<Option<Asset>> {
        self.commit(|store| Ok(store.remove(id)))
    }

    /// Swap the payload of `id`. Returns `false` when `id` is absent.
    pub fn replace_image(&mut self, id: &AssetId, image: ImagePayload) -> DraggenResult<bool> {
        let replaced = self.commit(|store| Ok(store.replace_image(id, image).then_some(())))?;
        Ok(replaced.is_some())
    }

    /// Chroma-key the stored image of `id` in place.
    ///
    /// Returns `false` when `id` is absent. Decode failures leave the asset untouched.
    #[tracing::instrument(skip(self, opts))]
    pub fn fix_transparency(&mut self, id: &AssetId, opts: &ChromaKeyOpts) -> DraggenResult<bool> {
        let Some(asset) = self.store.get(id) else {
            tracing::debug!("asset no longer present");
            return Ok(false);
        };
        let keyed = key_payload(asset.image(), opts)?;
        self.replace_image(id, keyed)
    }

    /// Run `mutate` on a copy of the store, save it, then swap it in.
    /// `Ok(None)` from `mutate` means nothing changed and skips the save.
    fn commit<T>(
        &mut self,
        mutate: impl FnOnce(&mut AssetStore) -> DraggenResult<Option<T>>,
    ) -> DraggenResult<Option<T>> {
        let mut next = self.store.clone();
        let Some(out) = mutate(&mut next)? else {
            return Ok(None);
        };
        self.repo.save(&next)?;
        self.store = next;
        Ok(Some(out))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/library/persistent.rs"]
mod tests;
