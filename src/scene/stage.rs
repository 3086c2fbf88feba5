use std::collections::HashSet;

use crate::chroma::key::{ChromaKeyOpts, key_payload};
use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{DraggenError, DraggenResult};
use crate::library::asset::{Asset, AssetType};
use crate::render::flatten::{FlattenOpts, FlattenedImage, flatten_items};
use crate::scene::item::{BlendMode, ItemPatch, StageItem, StageItemId};
use crate::scene::selection::Selection;

/// Where new items land.
pub const DEFAULT_PLACEMENT: Point = Point::new(400.0, 300.0);
/// Offset applied to duplicates.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);
/// Lower bound for [`Stage::scale_selected`].
pub const MIN_SCALE: f64 = 0.1;

/// Placement defaults for a [`Stage`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageOpts {
    /// Center of newly added items.
    pub placement: Point,
    /// Initial scale of `car` assets.
    pub car_scale: f64,
    /// Initial scale of every other asset type.
    pub default_scale: f64,
    /// Offset of duplicates from their source.
    pub duplicate_offset: Vec2,
    /// Floor for interactive scaling.
    pub min_scale: f64,
}

impl Default for StageOpts {
    fn default() -> Self {
        Self {
            placement: DEFAULT_PLACEMENT,
            car_scale: 1.5,
            default_scale: 1.0,
            duplicate_offset: DUPLICATE_OFFSET,
            min_scale: MIN_SCALE,
        }
    }
}

/// Direction for [`Stage::reorder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZOrder {
    /// Above every item.
    Front,
    /// Below every item.
    Back,
}

/// Pointer interaction state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    /// No button held.
    #[default]
    Idle,
    /// Button held after pressing on an item.
    Dragging {
        /// Screen position of the previous pointer event.
        last_screen: Point,
    },
}

/// The workbench scene graph: placed items, the selection and the pointer state machine.
///
/// Items are kept in insertion order, which breaks ties between equal `z_index` values.
#[derive(Clone, Debug)]
pub struct Stage {
    opts: StageOpts,
    items: Vec<StageItem>,
    next_id: u64,
    selection: Selection,
    drag: DragState,
    view_zoom: f64,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    /// An empty stage with default placement.
    pub fn new() -> Self {
        Self::with_opts(StageOpts::default())
    }

    /// An empty stage with custom placement defaults.
    pub fn with_opts(opts: StageOpts) -> Self {
        Self {
            opts,
            items: Vec::new(),
            next_id: 1,
            selection: Selection::default(),
            drag: DragState::Idle,
            view_zoom: 1.0,
        }
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[StageItem] {
        &self.items
    }

    /// Look up an item.
    pub fn get(&self, id: StageItemId) -> Option<&StageItem> {
        self.items.iter().find(|it| it.id == id)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return `true` when the stage holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Current pointer state.
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Current view zoom.
    pub fn view_zoom(&self) -> f64 {
        self.view_zoom
    }

    /// Set the zoom used to convert screen deltas into stage deltas.
    pub fn set_view_zoom(&mut self, zoom: f64) -> DraggenResult<()> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(DraggenError::validation(format!(
                "view zoom must be finite and > 0, got {zoom}"
            )));
        }
        self.view_zoom = zoom;
        Ok(())
    }

    fn alloc_id(&mut self) -> StageItemId {
        let id = StageItemId(self.next_id);
        self.next_id += 1;
        id
    }

    fn max_z(&self) -> i64 {
        self.items.iter().map(|it| it.z_index).max().unwrap_or(0)
    }

    fn min_z(&self) -> i64 {
        self.items.iter().map(|it| it.z_index).min().unwrap_or(0)
    }

    fn target_set(targets: &[StageItemId]) -> HashSet<StageItemId> {
        targets.iter().copied().collect()
    }

    /// Place a copy of `asset` on top of the stage and select it.
    pub fn add_item(&mut self, asset: &Asset) -> StageItemId {
        let id = self.alloc_id();
        let scale = match asset.asset_type() {
            AssetType::Car => self.opts.car_scale,
            _ => self.opts.default_scale,
        };
        let item = StageItem {
            id,
            asset_id: asset.id().clone(),
            asset_type: asset.asset_type(),
            image: asset.image().clone(),
            position: self.opts.placement,
            scale,
            rotation_deg: 0.0,
            z_index: self.max_z() + 1,
            blend_mode: BlendMode::Normal,
        };
        tracing::debug!(%id, asset = %item.asset_id, z = item.z_index, "add stage item");
        self.items.push(item);
        self.selection.select_only(id);
        id
    }

    /// Apply `patch` to every target. Returns the number of items changed.
    pub fn update_items(
        &mut self,
        targets: &[StageItemId],
        patch: ItemPatch,
    ) -> DraggenResult<usize> {
        self.update_items_with(targets, |_| patch.clone())
    }

    /// Apply a per-item patch computed from each target's current state.
    ///
    /// All patches are computed and validated before any is applied.
    pub fn update_items_with(
        &mut self,
        targets: &[StageItemId],
        mut patch_for: impl FnMut(&StageItem) -> ItemPatch,
    ) -> DraggenResult<usize> {
        let set = Self::target_set(targets);
        let mut patches = Vec::new();
        for (idx, item) in self.items.iter().enumerate() {
            if set.contains(&item.id) {
                let patch = patch_for(item);
                patch.validate()?;
                patches.push((idx, patch));
            }
        }
        let n = patches.len();
        for (idx, patch) in patches {
            patch.apply_to(&mut self.items[idx]);
        }
        Ok(n)
    }

    /// Clone the targets above every current item and select the clones.
    ///
    /// Returns the new ids in stage order. Empty or unknown targets leave the stage untouched.
    pub fn duplicate(&mut self, targets: &[StageItemId]) -> Vec<StageItemId> {
        let set = Self::target_set(targets);
        let sources: Vec<StageItem> = self
            .items
            .iter()
            .filter(|it| set.contains(&it.id))
            .cloned()
            .collect();
        if sources.is_empty() {
            return Vec::new();
        }

        let base_z = self.max_z();
        let mut new_ids = Vec::with_capacity(sources.len());
        for (i, mut clone) in sources.into_iter().enumerate() {
            clone.id = self.alloc_id();
            clone.position += self.opts.duplicate_offset;
            clone.z_index = base_z + 1 + i as i64;
            new_ids.push(clone.id);
            self.items.push(clone);
        }
        self.selection.select_all(new_ids.iter().copied());
        new_ids
    }

    /// Remove the targets and drop them from the selection. Returns the number removed.
    pub fn delete(&mut self, targets: &[StageItemId]) -> usize {
        let set = Self::target_set(targets);
        let before = self.items.len();
        self.items.retain(|it| !set.contains(&it.id));
        for id in &set {
            self.selection.remove(*id);
        }
        before - self.items.len()
    }

    /// Move the targets above (or below) every item. All targets share the new `z_index`.
    pub fn reorder(&mut self, targets: &[StageItemId], direction: ZOrder) -> usize {
        let z = match direction {
            ZOrder::Front => self.max_z() + 1,
            ZOrder::Back => self.min_z() - 1,
        };
        let set = Self::target_set(targets);
        let mut n = 0;
        for item in self.items.iter_mut().filter(|it| set.contains(&it.id)) {
            item.z_index = z;
            n += 1;
        }
        n
    }

    /// Advance each target's blend mode one step along [`BlendMode::CYCLE`].
    pub fn cycle_blend_mode(&mut self, targets: &[StageItemId]) -> usize {
        let set = Self::target_set(targets);
        let mut n = 0;
        for item in self.items.iter_mut().filter(|it| set.contains(&it.id)) {
            item.blend_mode = item.blend_mode.next();
            n += 1;
        }
        n
    }

    /// Chroma-key the targets' own image copies.
    ///
    /// Every target is keyed before any is replaced; the first failure aborts with no change.
    #[tracing::instrument(skip_all, fields(targets = targets.len()))]
    pub fn key_items(
        &mut self,
        targets: &[StageItemId],
        opts: &ChromaKeyOpts,
    ) -> DraggenResult<usize> {
        let set = Self::target_set(targets);
        let mut keyed = Vec::new();
        for (idx, item) in self.items.iter().enumerate() {
            if set.contains(&item.id) {
                keyed.push((idx, key_payload(&item.image, opts)?));
            }
        }
        let n = keyed.len();
        for (idx, image) in keyed {
            self.items[idx].image = image;
        }
        Ok(n)
    }

    /// Press on an item.
    ///
    /// Additive presses toggle the item. Exclusive presses select only the item unless it is
    /// already selected, in which case the selection is kept for a group drag.
    pub fn pointer_down_on_item(&mut self, id: StageItemId, screen: Point, additive: bool) {
        if self.get(id).is_none() {
            return;
        }
        if additive {
            self.selection.toggle(id);
        } else if !self.selection.contains(id) {
            self.selection.select_only(id);
        }
        self.drag = DragState::Dragging {
            last_screen: screen,
        };
    }

    /// Press on empty stage space: clears the selection.
    pub fn pointer_down_on_stage(&mut self) {
        self.selection.clear();
        self.drag = DragState::Idle;
    }

    /// Pointer moved to `screen`. While dragging, every selected item follows the pointer.
    ///
    /// Returns `true` when items moved.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let DragState::Dragging { last_screen } = self.drag else {
            return false;
        };
        let delta = (screen - last_screen) / self.view_zoom;
        self.drag = DragState::Dragging {
            last_screen: screen,
        };
        if delta == Vec2::ZERO || self.selection.is_empty() {
            return false;
        }
        for item in self
            .items
            .iter_mut()
            .filter(|it| self.selection.contains(it.id))
        {
            item.position += delta;
        }
        true
    }

    /// Release the pointer.
    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Add `delta` to the scale of every selected item, flooring at the minimum scale.
    pub fn scale_selected(&mut self, delta: f64) -> DraggenResult<usize> {
        let floor = self.opts.min_scale;
        let targets = self.selection.ids();
        self.update_items_with(&targets, |it| {
            ItemPatch::default().with_scale((it.scale + delta).max(floor))
        })
    }

    /// Add `delta_deg` to the rotation of every selected item.
    pub fn rotate_selected(&mut self, delta_deg: f64) -> DraggenResult<usize> {
        let targets = self.selection.ids();
        self.update_items_with(&targets, |it| {
            ItemPatch::default().with_rotation_deg(it.rotation_deg + delta_deg)
        })
    }

    /// [`Stage::duplicate`] on the selection.
    pub fn duplicate_selected(&mut self) -> Vec<StageItemId> {
        let targets = self.selection.ids();
        self.duplicate(&targets)
    }

    /// [`Stage::delete`] on the selection.
    pub fn delete_selected(&mut self) -> usize {
        let targets = self.selection.ids();
        self.delete(&targets)
    }

    /// [`Stage::reorder`] on the selection.
    pub fn reorder_selected(&mut self, direction: ZOrder) -> usize {
        let targets = self.selection.ids();
        self.reorder(&targets, direction)
    }

    /// Cycle the blend mode of the selected item. Only acts when exactly one item is selected.
    pub fn cycle_selected_blend_mode(&mut self) -> Option<BlendMode> {
        let id = self.selection.single()?;
        self.cycle_blend_mode(&[id]);
        self.get(id).map(|it| it.blend_mode)
    }

    /// Items sorted by `z_index`, ties in insertion order.
    pub fn paint_order(&self) -> Vec<&StageItem> {
        let mut order: Vec<&StageItem> = self.items.iter().collect();
        order.sort_by_key(|it| it.z_index);
        order
    }

    /// Rasterize every item into one image. An empty stage yields `None`.
    pub fn flatten(&self, opts: &FlattenOpts) -> DraggenResult<Option<FlattenedImage>> {
        flatten_items(&self.items, opts)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/stage.rs"]
mod tests;
