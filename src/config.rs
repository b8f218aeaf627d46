//! Runtime settings resolved from the environment.

use crate::error::{NanoVizError, Result};

/// Environment variables checked for the API key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Environment variable overriding the API root.
pub const BASE_URL_ENV_VAR: &str = "NANOVIZ_BASE_URL";

/// Default Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Settings shared by every generation in a process.
#[derive(Clone)]
pub struct Settings {
    api_key: Option<String>,
    base_url: String,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    ///
    /// The first non-empty value among [`API_KEY_ENV_VARS`] becomes the key.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = API_KEY_ENV_VARS
            .into_iter()
            .filter_map(&lookup)
            .find(|value| !value.trim().is_empty());

        let base_url = lookup(BASE_URL_ENV_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self { api_key, base_url }
    }

    /// Replaces the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Replaces the API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the API key, or a configuration error if none was found.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(NanoVizError::MissingApiKey)
    }

    /// Returns the API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}
