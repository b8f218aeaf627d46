//! Error types for image generation.

use std::time::Duration;

/// Maximum length of a vendor error message kept in an error value.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Broad failure categories, used by callers that only care about where a
/// run went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No credential was available. Raised before any network activity.
    Configuration,
    /// The remote call failed (transport, auth, quota, malformed request or
    /// malformed response).
    Vendor,
    /// The call succeeded but the response carried no image payload.
    NoContent,
    /// Reading an input image or writing the output failed locally.
    Io,
}

/// Errors that can occur during image generation.
#[derive(Debug, thiserror::Error)]
pub enum NanoVizError {
    /// No API key in any recognized environment variable.
    #[error("no API key found: set GOOGLE_API_KEY or GEMINI_API_KEY in .env or environment")]
    MissingApiKey,

    /// API key rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit or quota exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Server-suggested delay, if one was sent.
        retry_after: Option<Duration>,
    },

    /// Billing is not enabled for the key's project.
    #[error("billing error: {0}")]
    Billing(String),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters (unknown model, bad aspect ratio, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response carried no inline image data.
    #[error("no image generated in response: {0}")]
    NoImage(String),

    /// The response's image payload was not valid base64.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (reading an input image, saving the output).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NanoVizError {
    /// Returns the failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingApiKey => ErrorKind::Configuration,
            Self::NoImage(_) => ErrorKind::NoContent,
            Self::Io(_) => ErrorKind::Io,
            Self::Auth(_)
            | Self::Api { .. }
            | Self::RateLimited { .. }
            | Self::Billing(_)
            | Self::ContentBlocked(_)
            | Self::InvalidRequest(_)
            | Self::Network(_)
            | Self::Decode(_) => ErrorKind::Vendor,
        }
    }
}

/// Result type alias for image generation operations.
pub type Result<T> = std::result::Result<T, NanoVizError>;

/// Parses a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Redacts Google API keys and truncates long vendor messages.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(MAX_ERROR_MESSAGE_LEN));
    let mut rest = text.trim();

    // Google API keys are "AIza" followed by 35 URL-safe characters.
    while let Some(pos) = rest.find("AIza") {
        out.push_str(&rest[..pos]);
        let key_len = rest[pos..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len() - pos);
        out.push_str("[REDACTED]");
        rest = &rest[pos + key_len..];
    }
    out.push_str(rest);

    if out.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let mut truncated: String = out.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        truncated.push_str("...");
        return truncated;
    }
    out
}
