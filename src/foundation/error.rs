/// Convenience result type used across draggen.
pub type DraggenResult<T> = Result<T, DraggenError>;

/// Top-level error taxonomy used by library APIs.
///
/// Operations with nothing to act on (an empty stage export, a fix on a removed asset) are not
/// errors; they return `Ok(None)`, `Ok(false)` or `Ok(0)`.
#[derive(thiserror::Error, Debug)]
pub enum DraggenError {
    /// The external image generator failed or returned no image data.
    #[error("generation error: {0}")]
    Generation(String),

    /// A raster payload could not be decoded into pixel data.
    #[error("decode error: {0}")]
    Decode(String),

    /// Persisted data could not be read, parsed or written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Invalid user-provided parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// A raster could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DraggenError {
    /// Build a [`DraggenError::Generation`] value.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`DraggenError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`DraggenError::Persistence`] value.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build a [`DraggenError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DraggenError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
