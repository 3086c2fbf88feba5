//! Persisted asset collection.

pub(crate) mod asset;
pub(crate) mod persistent;
pub(crate) mod repository;
pub(crate) mod store;
