//! Convenience re-exports for common `askwall` types.
//!
//! ```ignore
//! use askwall::prelude::*;
//! ```
//!
//! Reply parsing helpers and form-building internals are left out. Import
//! those from [`transport`](crate::transport) directly when needed.

// ── Domain ──────────────────────────────────────────────────────────
pub use crate::attachment::{Attachment, AttachmentError, AttachmentHolder, Slot};
pub use crate::mode::{ModeCatalog, ModeError, ModeSelector, ModeSpec};
pub use crate::request::{PendingRequest, compose};
pub use crate::transcript::{Speaker, Transcript, TranscriptEntry};

// ── Runtime ─────────────────────────────────────────────────────────
pub use crate::config::ClientConfig;
pub use crate::controller::{ChatController, SubmitOutcome, SubmitStart};
pub use crate::events::{
    ChatEvent, CompositeEventHandler, EventHandler, FnEventHandler, LoggingHandler, NoopHandler,
};
pub use crate::transport::{HttpTransport, ServerReply, Transport, TransportError};

// ── UI state ────────────────────────────────────────────────────────
pub use crate::ui::tracing::{LogBuffer, UiTracingLayer};
pub use crate::ui::{ChatState, LogLevel, LogLine, Phase, SharedChatState};
