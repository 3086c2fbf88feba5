//! Platform-independent raster values and the decode/encode adapters over the `image` crate.

pub(crate) mod buffer;
pub(crate) mod payload;
