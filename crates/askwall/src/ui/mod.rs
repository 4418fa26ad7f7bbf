//! Shared chat state read by frontends and written by the controller.
//!
//! This module holds the data model any frontend (terminal, headless CLI,
//! tests) renders from. It has no rendering dependencies.
//!
//! # Architecture
//!
//! ```text
//! ChatController ──writes──▶ Arc<Mutex<ChatState>> ◀──reads── frontend
//!        ▲                                                      │
//!        └──────────────────── commands ─────────────────────────┘
//! ```
//!
//! The controller owns every state transition. Frontends only read the
//! state and send commands back; the one thing they write directly is the
//! input draft and the quit flag.

pub mod tracing;

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::attachment::AttachmentHolder;
use crate::mode::ModeSelector;
use crate::transcript::{Transcript, TranscriptEntry};

/// Maximum log lines kept in memory.
pub const MAX_LOG_LINES: usize = 2000;
/// Trim to this many when the cap is exceeded.
pub const LOG_TRIM_TO: usize = 1200;

/// State shared between the controller and a frontend.
pub type SharedChatState = Arc<Mutex<ChatState>>;

// ── Phase ─────────────────────────────────────────────────────────────

/// Whether a question is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingResponse,
}

// ── Log Types ─────────────────────────────────────────────────────────

/// A single log line captured from tracing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogLine {
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

/// Log severity level (mirrors tracing levels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Short fixed-width label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warn => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

// ── ChatState ─────────────────────────────────────────────────────────

/// Everything a frontend needs to draw the widget.
#[derive(Debug)]
pub struct ChatState {
    pub selector: ModeSelector,
    pub attachments: AttachmentHolder,
    pub transcript: Transcript,
    /// Question being typed. Cleared when a question settles.
    pub input: String,
    pub phase: Phase,
    /// One-line feedback for the user (rejected mode, unreadable file, ...).
    pub status: Option<String>,
    /// Where questions are sent, for display.
    pub endpoint: String,
    pub logs: Vec<LogLine>,
    /// The frontend sets this when the user asks to quit.
    pub quit_requested: bool,
}

impl ChatState {
    pub fn new(selector: ModeSelector) -> Self {
        Self {
            selector,
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Whether the attachment controls should be shown.
    pub fn attachments_visible(&self) -> bool {
        self.selector.requires_attachments()
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    pub fn into_shared(self) -> SharedChatState {
        Arc::new(Mutex::new(self))
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            selector: ModeSelector::default(),
            attachments: AttachmentHolder::default(),
            transcript: Transcript::default(),
            input: String::new(),
            phase: Phase::Idle,
            status: None,
            endpoint: String::new(),
            logs: Vec::new(),
            quit_requested: false,
        }
    }
}

// ── Convenience Updaters ──────────────────────────────────────────────

/// Lock the shared state mutex and run a closure on the guard.
/// Silently ignores poisoned locks (no log spam inside UI frontends).
macro_rules! with_state {
    ($state:expr, |$s:ident| $body:block) => {
        if let Ok(mut $s) = $state.lock() {
            $body
        }
    };
}
pub(crate) use with_state;

/// Replace the one-line status message.
pub fn set_status(state: &SharedChatState, status: Option<String>) {
    with_state!(state, |s| { s.status = status });
}

/// Replace the input draft.
pub fn set_input(state: &SharedChatState, text: &str) {
    with_state!(state, |s| { s.input = text.to_string() });
}

/// Ask every reader of the state to shut down.
pub fn request_quit(state: &SharedChatState) {
    with_state!(state, |s| { s.quit_requested = true });
}

/// Copy of the transcript entries, for rendering outside the lock.
pub fn transcript_snapshot(state: &SharedChatState) -> Vec<TranscriptEntry> {
    state
        .lock()
        .map(|s| s.transcript.entries().to_vec())
        .unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────
