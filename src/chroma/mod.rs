//! Color-distance background removal.

pub(crate) mod key;
