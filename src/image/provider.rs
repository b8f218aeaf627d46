//! Image provider trait.

use crate::error::Result;
use crate::image::types::{ContentRequest, GeneratedImage};
use async_trait::async_trait;

/// Trait for image generation backends.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Submits the assembled parts and returns the first image in the
    /// response.
    async fn generate(&self, request: &ContentRequest) -> Result<GeneratedImage>;

    /// Returns the model identifier requests are sent to.
    fn model(&self) -> &str;
}
