/// Base URL used when `MANDI_API_URL` is not set.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "MANDI_API_URL";

/// Price-data API configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to, e.g. `http://localhost:8000/api`.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read the base URL from `MANDI_API_URL`, falling back to [`DEFAULT_API_BASE_URL`].
    pub fn from_env() -> Self {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }
}
