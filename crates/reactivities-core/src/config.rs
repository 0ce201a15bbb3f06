//! Client configuration.
//!
//! Front ends resolve a `ClientConfig` from their own sources (flags, env,
//! config files) and hand it to the HTTP agent.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// API base URL used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "REACTIVITIES_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            api_base_url: normalize_api_url(api_base_url.as_ref())?,
        })
    }

    /// Resolve the config from candidates in priority order.
    ///
    /// The first non-empty candidate wins; the default applies when all are
    /// empty. The winning value must be an http(s) URL.
    pub fn resolve<I>(candidates: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<String>>,
    {
        candidates
            .into_iter()
            .find_map(normalize_text_option)
            .map_or_else(|| Ok(Self::default()), Self::new)
    }
}

pub fn normalize_api_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("API URL must not be empty".to_string()));
    }
    if !is_http_url(trimmed) {
        return Err(Error::Config(
            "API URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
