//! The generation pipeline: resolve, load, submit, save.

use crate::config::Settings;
use crate::error::Result;
use crate::image::input::load_input_images;
use crate::image::providers::{GeminiModel, GeminiProvider};
use crate::image::{
    AspectRatio, ContentRequest, GenerationRequest, GenerationResult, ImageProvider,
};

/// Generates an image with Gemini and writes it to `request.output`.
///
/// Fails with a configuration error before any network client is built if
/// `settings` carries no API key.
pub async fn generate_image(
    request: &GenerationRequest,
    settings: &Settings,
) -> Result<GenerationResult> {
    let api_key = settings.require_api_key()?;

    let provider = GeminiProvider::builder()
        .api_key(api_key)
        .model(GeminiModel::from_alias(&request.model))
        .base_url(settings.base_url())
        .build()?;

    generate_with(&provider, request).await
}

/// Runs a request against any provider.
pub async fn generate_with<P>(provider: &P, request: &GenerationRequest) -> Result<GenerationResult>
where
    P: ImageProvider + ?Sized,
{
    let content = build_content(request)?;
    tracing::debug!(
        model = provider.model(),
        edit = request.is_edit(),
        images = content.parts.len() - 1,
        "generating image"
    );
    let image = provider.generate(&content).await?;

    image.save(&request.output)?;
    let path = std::path::absolute(&request.output)?;
    tracing::debug!(path = %path.display(), bytes = image.size(), "image saved");

    Ok(GenerationResult {
        path,
        size_bytes: image.size(),
        mime_type: image.mime_type,
        metadata: image.metadata,
    })
}

/// Loads input images and assembles them, followed by the prompt, into the
/// payload a provider submits.
pub fn build_content(request: &GenerationRequest) -> Result<ContentRequest> {
    let images = load_input_images(&request.input_images)?;
    Ok(ContentRequest::new(
        images,
        &request.prompt,
        AspectRatio::from_alias(&request.aspect_ratio),
    ))
}
