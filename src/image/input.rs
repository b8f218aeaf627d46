//! Loading reference images from disk.

use crate::error::Result;
use crate::image::types::{ContentPart, ImageFormat};
use std::path::Path;

/// Returns the content type label for an input image.
///
/// The label comes from the file extension, lowercased, with `jpg`
/// normalized to `jpeg`. Files without an extension are sniffed instead.
pub fn mime_type_for(path: &Path, data: &[u8]) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            if ext == "jpg" {
                "image/jpeg".to_string()
            } else {
                format!("image/{ext}")
            }
        }
        _ => ImageFormat::from_magic_bytes(data)
            .map(|f| f.mime_type())
            .unwrap_or("application/octet-stream")
            .to_string(),
    }
}

/// Reads one input image. Returns `None` if the path does not exist.
pub fn load_input_image(path: &Path) -> Result<Option<ContentPart>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "skipping missing input image");
        return Ok(None);
    }

    let data = std::fs::read(path)?;
    let mime_type = mime_type_for(path, &data);
    tracing::debug!(path = %path.display(), %mime_type, bytes = data.len(), "loaded input image");

    Ok(Some(ContentPart::InlineImage { mime_type, data }))
}

/// Reads every existing input image, keeping the given order.
pub fn load_input_images<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ContentPart>> {
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        if let Some(part) = load_input_image(path.as_ref())? {
            parts.push(part);
        }
    }
    Ok(parts)
}
