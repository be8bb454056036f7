//! Runtime configuration for the backend connection

use std::time::Duration;

const BACKEND_URL_ENV: &str = "IMPULSE_BACKEND_URL";
const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// How long an HTTP request may take before it is treated as a network failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(7);

/// Client configuration, resolved once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub backend_url: String,
}

impl Config {
    /// Resolve the backend base URL from the environment, falling back to
    /// localhost for development setups.
    pub fn from_env() -> Self {
        let backend_url = std::env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let backend_url = backend_url.trim_end_matches('/').to_string();
        tracing::info!(backend_url = %backend_url, "Backend configured");

        Self { backend_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = Config {
            backend_url: "http://localhost:8080///".trim_end_matches('/').to_string(),
        };
        assert_eq!(config.backend_url, "http://localhost:8080");
    }
}
