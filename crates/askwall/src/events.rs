//! Events emitted by the [`ChatController`](crate::controller::ChatController).
//!
//! Callers implement [`EventHandler`] to observe what the controller did:
//! for logging, metrics, or driving a frontend that does not read the
//! shared [`ChatState`](crate::ui::ChatState) directly.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or headless runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures |
//! | [`CompositeEventHandler`] | Several handlers in order |

use crate::attachment::Slot;
use crate::mode::ModeError;
use crate::request::PendingRequest;
use crate::transcript::TranscriptEntry;
use tracing::{debug, info, warn};

/// Why a submission was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Another question is still waiting for its answer.
    Busy,
}

/// Something the controller just did.
#[derive(Debug)]
pub enum ChatEvent<'a> {
    /// The active mode changed.
    ModeChanged {
        id: &'a str,
        requires_attachments: bool,
    },
    /// A mode selection was refused; the previous mode is still active.
    ModeRejected { error: &'a ModeError },
    /// An attachment slot was filled (`Some`) or emptied (`None`).
    AttachmentSet {
        slot: Slot,
        file_name: Option<&'a str>,
    },
    /// A blank question was dropped.
    QuestionDropped,
    /// A submission was refused.
    SubmitRejected { reason: RejectReason },
    /// The user's entry is in the transcript and the request is going out.
    RequestSent { request: &'a PendingRequest },
    /// The call settled and the bot's entry was appended.
    Settled { entry: &'a TranscriptEntry },
    /// The server acknowledged (or failed) a conversation reset.
    ConversationEnded { entry: &'a TranscriptEntry },
}

/// Observer for [`ChatEvent`]s.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &ChatEvent<'_>);
}

/// Ignores every event.
pub struct NoopHandler;

impl EventHandler for NoopHandler {
    fn on_event(&self, _event: &ChatEvent<'_>) {}
}

/// Logs events through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &ChatEvent<'_>) {
        match event {
            ChatEvent::ModeChanged {
                id,
                requires_attachments,
            } => info!(
                "Mode {} selected (attachments {})",
                id,
                if *requires_attachments { "on" } else { "off" }
            ),
            ChatEvent::ModeRejected { error } => warn!("Mode not changed: {error}"),
            ChatEvent::AttachmentSet { slot, file_name } => match file_name {
                Some(name) => info!("Attached {name} as {slot}"),
                None => info!("Cleared {slot}"),
            },
            ChatEvent::QuestionDropped => debug!("Blank question dropped"),
            ChatEvent::SubmitRejected { reason } => {
                warn!("Submission rejected: {reason:?}")
            }
            ChatEvent::RequestSent { request } => info!(
                "Question sent (option={}, attachments={})",
                request.option,
                request.attachments.len()
            ),
            ChatEvent::Settled { entry } => {
                if entry.is_error() {
                    warn!("Question settled with failure: {}", entry.text);
                } else {
                    info!("Answer received ({} chars)", entry.text.chars().count());
                }
            }
            ChatEvent::ConversationEnded { entry } => info!("Conversation reset: {}", entry.text),
        }
    }
}

/// Wraps a closure as an [`EventHandler`].
pub struct FnEventHandler<F>(pub F);

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&ChatEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &ChatEvent<'_>) {
        (self.0)(event)
    }
}

/// Forwards each event to every inner handler, in insertion order.
#[derive(Default)]
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &ChatEvent<'_>) {
        for h in &self.handlers {
            h.on_event(event);
        }
    }
}
