use crate::foundation::core::TimestampMs;
use crate::foundation::error::DraggenResult;
use crate::generate::client::{GenerationRequest, ImageGenerator};
use crate::generate::prompt::GenerationConfig;
use crate::library::asset::AssetId;
use crate::library::persistent::AssetLibrary;
use crate::library::repository::KeyValueSlot;

/// Generate one image for `config` and add it to the front of `library`.
///
/// A blank prompt does nothing and returns `Ok(None)`. The stored prompt is the user's text, not
/// the assembled generator prompt.
#[tracing::instrument(skip_all, fields(asset_type = %config.asset_type, style = %config.style))]
pub fn generate_asset<S, G>(
    library: &mut AssetLibrary<S>,
    generator: &G,
    config: &GenerationConfig,
    now: TimestampMs,
) -> DraggenResult<Option<AssetId>>
where
    S: KeyValueSlot,
    G: ImageGenerator + ?Sized,
{
    if config.is_blank() {
        tracing::debug!("blank prompt, nothing to generate");
        return Ok(None);
    }

    let request = GenerationRequest::from_config(config);
    let payload = generator.generate(&request)?.into_payload()?;
    let id = library.create(
        payload,
        config.prompt.trim(),
        config.asset_type,
        config.style,
        now,
    )?;
    tracing::info!(%id, "generated asset");
    Ok(Some(id))
}

#[cfg(test)]
#[path = "../../tests/unit/generate/flow.rs"]
mod tests;
