//! Image generation module.

pub mod input;
mod provider;
pub mod providers;
mod types;

pub use provider::ImageProvider;
pub use types::{
    AspectRatio, ContentPart, ContentRequest, GeneratedImage, GenerationMetadata,
    GenerationRequest, GenerationResult, ImageFormat, DEFAULT_ASPECT, DEFAULT_MODEL,
    DEFAULT_OUTPUT,
};
