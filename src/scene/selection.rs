use std::collections::BTreeSet;

use crate::scene::item::StageItemId;

/// Set of selected stage items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<StageItemId>,
}

impl Selection {
    /// Replace the selection with exactly `id`.
    pub fn select_only(&mut self, id: StageItemId) {
        self.ids.clear();
        self.ids.insert(id);
    }

    /// Replace the selection with `ids`.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = StageItemId>) {
        self.ids = ids.into_iter().collect();
    }

    /// Add `id` if absent, remove it otherwise.
    pub fn toggle(&mut self, id: StageItemId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Drop `id` from the selection.
    pub fn remove(&mut self, id: StageItemId) -> bool {
        self.ids.remove(&id)
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Return `true` when `id` is selected.
    pub fn contains(&self, id: StageItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of selected items.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Return `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The selected id when exactly one item is selected.
    pub fn single(&self) -> Option<StageItemId> {
        match self.ids.len() {
            1 => self.ids.first().copied(),
            _ => None,
        }
    }

    /// Selected ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StageItemId> + '_ {
        self.ids.iter().copied()
    }

    /// Selected ids as a vector.
    pub fn ids(&self) -> Vec<StageItemId> {
        self.iter().collect()
    }
}
