//! Chat session configuration with sensible defaults.
//!
//! [`ChatAppConfig`] captures what an interactive session needs and
//! converts it into askwall types via [`client_config`](ChatAppConfig::client_config)
//! and [`build_state`](ChatAppConfig::build_state).

use std::time::Duration;

use askwall::config::{ClientConfig, DEFAULT_BASE_URL};
use askwall::mode::{DEFAULT_MODE_ID, ModeCatalog, ModeError, ModeSelector};
use askwall::request::DEFAULT_IDENTITY;
use askwall::ui::ChatState;

/// Configuration for an interactive chat session.
#[derive(Debug, Clone)]
pub struct ChatAppConfig {
    /// Default: `"http://127.0.0.1:5000"`.
    pub base_url: String,
    /// Default: `"anonymous_user"`.
    pub identity: String,
    /// Request timeout in seconds; `0` waits forever. Default: `120`.
    pub timeout_secs: u64,
    /// Mode active when the session opens. Default: `"1"`.
    pub initial_mode: String,
    /// Open with the logs pane visible. Default: `false`.
    pub show_logs: bool,
}

impl Default for ChatAppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            identity: DEFAULT_IDENTITY.to_string(),
            timeout_secs: 120,
            initial_mode: DEFAULT_MODE_ID.to_string(),
            show_logs: false,
        }
    }
}

impl ChatAppConfig {
    /// Build the [`ClientConfig`] for the HTTP transport.
    pub fn client_config(&self) -> ClientConfig {
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        ClientConfig::default()
            .with_base_url(self.base_url.as_str())
            .with_identity(self.identity.as_str())
            .with_timeout(timeout)
    }

    /// Build the initial [`ChatState`] with the default catalog and the
    /// configured starting mode.
    pub fn build_state(&self) -> Result<ChatState, ModeError> {
        let selector = ModeSelector::new(ModeCatalog::default(), &self.initial_mode)?;
        Ok(ChatState::new(selector).with_endpoint(self.client_config().chat_url()))
    }
}
