use serde::{Deserialize, Serialize};

use crate::foundation::error::{DraggenError, DraggenResult};
use crate::generate::prompt::{AspectRatio, GenerationConfig, build_prompt};
use crate::raster::payload::{ImagePayload, PNG_MIME};

/// One call to an image generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Full prompt text.
    pub prompt: String,
    /// Requested aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Optional image to condition on, serialized as a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ImagePayload>,
}

impl GenerationRequest {
    /// Build the request for `config`.
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            prompt: build_prompt(config),
            aspect_ratio: config.aspect_ratio,
            reference: config.reference.clone(),
        }
    }

    /// Attach a reference image.
    pub fn with_reference(mut self, reference: ImagePayload) -> Self {
        self.reference = Some(reference);
        self
    }
}

/// Image returned by a generator: base64 data plus its mime type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Mime type; empty means PNG.
    #[serde(default)]
    pub mime_type: String,
    /// Base64 image bytes.
    pub data: String,
}

impl GeneratedImage {
    /// Decode the base64 data into a payload.
    pub fn into_payload(self) -> DraggenResult<ImagePayload> {
        if self.data.trim().is_empty() {
            return Err(DraggenError::generation("no image data found in response"));
        }
        let mime = if self.mime_type.trim().is_empty() {
            PNG_MIME.to_owned()
        } else {
            self.mime_type
        };
        ImagePayload::from_base64(mime, self.data.trim())
    }
}

/// Text-to-image service.
///
/// Implementations make a single attempt per call; failures surface as
/// [`DraggenError::Generation`].
pub trait ImageGenerator {
    /// Produce one image for `request`.
    fn generate(&self, request: &GenerationRequest) -> DraggenResult<GeneratedImage>;
}

impl<G: ImageGenerator + ?Sized> ImageGenerator for &G {
    fn generate(&self, request: &GenerationRequest) -> DraggenResult<GeneratedImage> {
        (**self).generate(request)
    }
}

impl<G: ImageGenerator + ?Sized> ImageGenerator for Box<G> {
    fn generate(&self, request: &GenerationRequest) -> DraggenResult<GeneratedImage> {
        (**self).generate(request)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/client.rs"]
mod tests;
