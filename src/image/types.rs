//! Core types for image generation.

use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Output path used when none is given.
pub const DEFAULT_OUTPUT: &str = "generated_image.png";

/// Model selector used when none is given.
pub const DEFAULT_MODEL: &str = "pro";

/// Aspect-ratio selector used when none is given.
pub const DEFAULT_ASPECT: &str = "landscape";

/// Image formats recognized by their magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Aspect ratio sent to the model.
///
/// Known aliases resolve to the fixed ratios; anything else is passed to the
/// API as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AspectRatio {
    /// 16:9 landscape, aliases `landscape` and `wide`.
    Landscape,
    /// 9:16 portrait.
    Portrait,
    /// 1:1 square.
    Square,
    /// 21:9 cinematic.
    Cinematic,
    /// Unrecognized selector, sent verbatim.
    Custom(String),
}

impl AspectRatio {
    /// Resolves a friendly alias, passing unknown values through unchanged.
    pub fn from_alias(alias: &str) -> Self {
        match alias {
            "landscape" | "wide" => Self::Landscape,
            "portrait" => Self::Portrait,
            "square" => Self::Square,
            "cinematic" => Self::Cinematic,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns the ratio string the API expects (e.g., "16:9").
    pub fn as_str(&self) -> &str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Square => "1:1",
            Self::Cinematic => "21:9",
            Self::Custom(ratio) => ratio,
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request to generate an image.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Where the generated image is written.
    pub output: PathBuf,
    /// Model alias (`pro`, `flash`) or a literal model id.
    pub model: String,
    /// Aspect alias (`landscape`, `wide`, ...) or a literal ratio.
    pub aspect_ratio: String,
    /// Reference images, sent ahead of the prompt in this order.
    pub input_images: Vec<PathBuf>,
}

impl GenerationRequest {
    /// Creates a new request with the given prompt and default settings.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            model: DEFAULT_MODEL.to_string(),
            aspect_ratio: DEFAULT_ASPECT.to_string(),
            input_images: Vec::new(),
        }
    }

    /// Sets the output path.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    /// Sets the model selector.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the aspect-ratio selector.
    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = ratio.into();
        self
    }

    /// Appends a reference image path.
    pub fn with_input_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_images.push(path.into());
        self
    }

    /// Returns true if this is an image editing request (has input images).
    pub fn is_edit(&self) -> bool {
        !self.input_images.is_empty()
    }
}

/// One unit of a multi-part request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Raw image bytes with their content type.
    InlineImage {
        /// Content type label, e.g. `image/jpeg`.
        mime_type: String,
        /// Raw file bytes.
        data: Vec<u8>,
    },
    /// Plain text.
    Text(String),
}

impl ContentPart {
    /// Returns true for image parts.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::InlineImage { .. })
    }
}

/// The assembled payload a provider submits: ordered parts plus the
/// resolved aspect ratio.
#[derive(Debug, Clone)]
pub struct ContentRequest {
    /// Images first, prompt text last.
    pub parts: Vec<ContentPart>,
    /// Requested aspect ratio.
    pub aspect_ratio: AspectRatio,
}

impl ContentRequest {
    /// Builds the payload from already-loaded images and a prompt.
    pub fn new(images: Vec<ContentPart>, prompt: &str, aspect_ratio: AspectRatio) -> Self {
        let mut parts = images;
        parts.push(ContentPart::Text(prompt.to_string()));
        Self {
            parts,
            aspect_ratio,
        }
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Text the model returned alongside the image.
    pub text: Option<String>,
}

/// A generated image with its data and metadata.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or processed"]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// MIME type declared by the API.
    pub mime_type: String,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, metadata: GenerationMetadata) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            metadata,
        }
    }

    /// Returns the actual format detected from magic bytes.
    pub fn detected_format(&self) -> Option<ImageFormat> {
        ImageFormat::from_magic_bytes(&self.data)
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image bytes verbatim to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

/// Outcome of a successful generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    /// Absolute path of the written image.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size_bytes: usize,
    /// MIME type declared by the API.
    pub mime_type: String,
    /// Generation metadata.
    #[serde(flatten)]
    pub metadata: GenerationMetadata,
}
