//! Host configuration parsed from environment variables.

use std::str::FromStr;

use canvas::camera::Size;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 720.0;
pub const DEFAULT_LABEL: &str = "object";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `BOXMARK_API_URL` was set but is empty after trimming.
    #[error("BOXMARK_API_URL must not be empty")]
    EmptyApiUrl,

    /// Viewport dimensions must both be positive.
    #[error("viewport must be positive, got {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Collaborator base URL, without a trailing slash.
    pub api_url: String,
    /// Headless viewport in screen pixels.
    pub viewport: Size,
    /// Initial active label for new sessions.
    pub default_label: String,
    pub timeouts: Timeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            viewport: Size::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            default_label: DEFAULT_LABEL.to_owned(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `BOXMARK_API_URL`: default `http://127.0.0.1:8000`
    /// - `BOXMARK_VIEWPORT_WIDTH` / `BOXMARK_VIEWPORT_HEIGHT`: default 1280x720
    /// - `BOXMARK_DEFAULT_LABEL`: default `object`
    /// - `BOXMARK_REQUEST_TIMEOUT_SECS`: default 120
    /// - `BOXMARK_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// Unparseable numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the resulting config fails [`Config::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("BOXMARK_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();
        let viewport = Size::new(
            env_parse("BOXMARK_VIEWPORT_WIDTH", DEFAULT_VIEWPORT_WIDTH),
            env_parse("BOXMARK_VIEWPORT_HEIGHT", DEFAULT_VIEWPORT_HEIGHT),
        );
        let default_label = std::env::var("BOXMARK_DEFAULT_LABEL").unwrap_or_else(|_| DEFAULT_LABEL.to_owned());
        let timeouts = Timeouts {
            request_secs: env_parse("BOXMARK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("BOXMARK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        let config = Self { api_url, viewport, default_label, timeouts };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Fails on an empty base URL or a non-positive (or NaN) viewport.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        let Size { width, height } = self.viewport;
        if !(width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidViewport { width, height });
        }
        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
