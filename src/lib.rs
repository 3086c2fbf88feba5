//! draggen assembles AI-generated 2D game art for drag-racing games.
//!
//! The crate is organized around four pieces:
//!
//! - [`AssetLibrary`]: a persisted, most-recent-first collection of generated images
//! - [`chroma_key`]: color-distance background removal with a soft edge band
//! - [`Stage`]: a workbench scene graph with selection, drag and z-ordering
//! - [`flatten_items`]: rasterizes a stage into one PNG-ready image
//!
//! Image generation itself sits behind the [`ImageGenerator`] trait; [`ProcessGenerator`] talks
//! to any external program over a small JSON protocol.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod chroma;
pub(crate) mod generate;
pub(crate) mod library;
pub(crate) mod raster;
pub(crate) mod render;
pub(crate) mod scene;

pub use crate::foundation::core::{Affine, Point, Rect, Rgb8, TimestampMs, Vec2};
pub use crate::foundation::error::{DraggenError, DraggenResult};

pub use crate::chroma::key::{
    ChromaKeyOpts, DEFAULT_SOFTNESS, DEFAULT_TOLERANCE, KeyBand, ReferenceColor, chroma_key,
    extract_alpha, key_payload, resolve_reference, sample_corners,
};
pub use crate::generate::client::{GeneratedImage, GenerationRequest, ImageGenerator};
pub use crate::generate::flow::generate_asset;
pub use crate::generate::process::ProcessGenerator;
pub use crate::generate::prompt::{
    AspectRatio, CarBuild, GenerationConfig, PaintColor, Perspective, build_prompt,
};
pub use crate::library::asset::{ArtStyle, Asset, AssetId, AssetType};
pub use crate::library::persistent::AssetLibrary;
pub use crate::library::repository::{
    AssetRepository, FileSlot, KeyValueSlot, MemorySlot, STORAGE_KEY,
};
pub use crate::library::store::AssetStore;
pub use crate::raster::buffer::RasterImage;
pub use crate::raster::payload::{ImagePayload, PNG_MIME};
pub use crate::render::bounds::{item_bounds, rotated_extent, union_bounds};
pub use crate::render::flatten::{
    EXPORT_PADDING, ExportFile, FlattenOpts, FlattenedImage, MAX_EXPORT_PIXELS, MAX_EXPORT_SIZE,
    MIN_EXPORT_SIZE, export_file_name, flatten_items,
};
pub use crate::scene::item::{BlendMode, ItemPatch, StageItem, StageItemId};
pub use crate::scene::selection::Selection;
pub use crate::scene::stage::{
    DEFAULT_PLACEMENT, DUPLICATE_OFFSET, DragState, MIN_SCALE, Stage, StageOpts, ZOrder,
};
