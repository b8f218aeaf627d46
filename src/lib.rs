#![warn(missing_docs)]
//! nanoviz - generate images with Gemini (Nano Banana) from a text prompt
//! and optional reference images.
//!
//! # Quick Start
//!
//! ```no_run
//! use nanoviz::{generate_image, GenerationRequest, Settings};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> nanoviz::Result<()> {
//!     let settings = Settings::from_env();
//!     let request = GenerationRequest::new("A golden retriever puppy")
//!         .with_output("puppy.png")
//!         .with_model("flash")
//!         .with_aspect_ratio("square");
//!     let result = generate_image(&request, &settings).await?;
//!     println!("Image saved: {}", result.path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Editing
//!
//! Reference images are sent ahead of the prompt, in the order given.
//! Paths that do not exist are skipped.
//!
//! ```no_run
//! # use nanoviz::{generate_image, GenerationRequest, Settings};
//! # async fn edit() -> nanoviz::Result<()> {
//! let request = GenerationRequest::new("Add a warm sunset glow")
//!     .with_input_image("photo.jpg")
//!     .with_output("edited.png");
//! generate_image(&request, &Settings::from_env()).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod generate;
pub mod image;

// Re-export error types at crate root
pub use error::{ErrorKind, NanoVizError, Result};

pub use config::{Settings, API_KEY_ENV_VARS, BASE_URL_ENV_VAR, DEFAULT_BASE_URL};
pub use generate::{build_content, generate_image, generate_with};

pub use image::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};
pub use image::{
    AspectRatio, ContentPart, ContentRequest, GeneratedImage, GenerationMetadata,
    GenerationRequest, GenerationResult, ImageProvider,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::error::{NanoVizError, Result};
    pub use crate::generate::generate_image;
    pub use crate::image::providers::GeminiProvider;
    pub use crate::image::{GenerationRequest, GenerationResult, ImageProvider};
}
