//! Stage flattening: bounds, blending and rasterization.

pub(crate) mod blend;
pub(crate) mod bounds;
pub(crate) mod flatten;
