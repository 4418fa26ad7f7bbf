//! Client configuration with sensible defaults.
//!
//! ```
//! use std::time::Duration;
//! use askwall::config::ClientConfig;
//!
//! let config = ClientConfig::default()
//!     .with_base_url("https://assist.example.com")
//!     .with_timeout(Some(Duration::from_secs(30)));
//! assert_eq!(config.chat_url(), "https://assist.example.com/api/interactive_chat");
//! ```

use std::time::Duration;

use crate::request::DEFAULT_IDENTITY;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CHAT_PATH: &str = "/api/interactive_chat";
pub const DEFAULT_END_PATH: &str = "/api/end_conversation";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Where and how the client talks to the assistant server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and port, without a trailing slash.
    /// Default: `"http://127.0.0.1:5000"`.
    pub base_url: String,
    /// Question endpoint. Default: `"/api/interactive_chat"`.
    pub chat_path: String,
    /// Conversation reset endpoint. Default: `"/api/end_conversation"`.
    pub end_path: String,
    /// Value of the `username` field. Default: `"anonymous_user"`.
    pub identity: String,
    /// Whole-request timeout. `None` waits forever. Default: 120 s.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            end_path: DEFAULT_END_PATH.to_string(),
            identity: DEFAULT_IDENTITY.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: format!("askwall/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = path.into();
        self
    }

    pub fn with_end_path(mut self, path: impl Into<String>) -> Self {
        self.end_path = path.into();
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }

    pub fn end_url(&self) -> String {
        format!("{}{}", self.base_url, self.end_path)
    }

    /// Check the config before building a transport from it.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base URL is empty".into());
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!("base URL must be http(s): {}", self.base_url));
        }
        for (label, path) in [("chat path", &self.chat_path), ("end path", &self.end_path)] {
            if !path.starts_with('/') {
                return Err(format!("{label} must start with '/': {path}"));
            }
        }
        if self.identity.is_empty() {
            return Err("identity is empty".into());
        }
        Ok(())
    }
}
