//! The interaction controller: from user actions to transcript entries.
//!
//! [`ChatController`] is a two-state machine over the shared
//! [`ChatState`](crate::ui::ChatState):
//!
//! ```text
//!            begin_submit (non-blank)
//!   Idle ─────────────────────────────▶ AwaitingResponse
//!    ▲                                          │
//!    └───────────── settle (any outcome) ───────┘
//! ```
//!
//! The user's entry is appended before the request leaves; the bot's entry
//! only after it settles. While a question is in flight further submissions
//! are rejected, so each bot entry answers the user entry right above it.
//! Mode and attachment changes stay available the whole time.
//!
//! The state lock is never held across an `.await`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::attachment::{Attachment, Slot};
use crate::events::{ChatEvent, EventHandler, NoopHandler, RejectReason};
use crate::mode::ModeError;
use crate::request::{DEFAULT_IDENTITY, PendingRequest, compose};
use crate::transcript::{ERROR_PREFIX, NO_ANSWER_TEXT, Speaker, TranscriptEntry, UNREACHABLE_TEXT};
use crate::transport::{ServerReply, Transport, TransportError};
use crate::ui::{ChatState, Phase, SharedChatState, with_state};

/// Result of the synchronous half of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStart {
    /// The question was blank. Nothing happened.
    Dropped,
    /// A question is already in flight. Nothing happened.
    Busy,
    /// The user's entry was appended and the request is ready to send.
    Started(PendingRequest),
}

/// Result of a full submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Dropped,
    Busy,
    /// The call settled; this is the bot entry that was appended.
    Answered(TranscriptEntry),
}

/// Map a settled call onto the text of the bot's transcript entry.
pub fn reply_text(result: &Result<ServerReply, TransportError>) -> String {
    match result {
        Ok(ServerReply::Answer(Some(text))) if !text.is_empty() => text.clone(),
        Ok(ServerReply::Answer(_)) => NO_ANSWER_TEXT.to_string(),
        Ok(ServerReply::Error(msg)) => format!("{ERROR_PREFIX}{msg}"),
        Err(_) => UNREACHABLE_TEXT.to_string(),
    }
}

/// Orchestrates mode selection, attachments and question submission.
pub struct ChatController<T: Transport> {
    state: SharedChatState,
    transport: T,
    identity: String,
    handler: Box<dyn EventHandler>,
}

impl<T: Transport> ChatController<T> {
    /// Controller over a fresh default [`ChatState`].
    pub fn new(transport: T) -> Self {
        Self::with_state(transport, Arc::new(Mutex::new(ChatState::default())))
    }

    /// Controller over an existing shared state.
    pub fn with_state(transport: T, state: SharedChatState) -> Self {
        Self {
            state,
            transport,
            identity: DEFAULT_IDENTITY.to_string(),
            handler: Box::new(NoopHandler),
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn with_event_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    /// The state shared with frontends.
    pub fn state(&self) -> &SharedChatState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().map(|s| s.phase).unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Mode ──────────────────────────────────────────────────────

    /// Switch the active mode. Returns whether attachments now apply.
    /// Unknown ids are rejected and the previous mode stays active.
    pub fn select_mode(&self, id: &str) -> Result<bool, ModeError> {
        let result = {
            let mut s = self.lock();
            let result = s
                .selector
                .select_mode(id)
                .map(|m| m.requires_attachments);
            s.status = result.as_ref().err().map(ToString::to_string);
            result
        };
        match &result {
            Ok(requires_attachments) => self.handler.on_event(&ChatEvent::ModeChanged {
                id,
                requires_attachments: *requires_attachments,
            }),
            Err(error) => self.handler.on_event(&ChatEvent::ModeRejected { error }),
        }
        result
    }

    /// Step to the next or previous mode. Returns the new mode id.
    pub fn cycle_mode(&self, forward: bool) -> String {
        let (id, requires_attachments) = {
            let mut s = self.lock();
            let mode = s.selector.cycle(forward);
            let out = (mode.id.clone(), mode.requires_attachments);
            s.status = None;
            out
        };
        self.handler.on_event(&ChatEvent::ModeChanged {
            id: &id,
            requires_attachments,
        });
        id
    }

    // ── Attachments ───────────────────────────────────────────────

    /// Fill or empty an attachment slot.
    pub fn set_file(&self, slot: Slot, file: Option<Attachment>) {
        let name = file.as_ref().map(|f| f.file_name.clone());
        with_state!(self.state, |s| {
            s.attachments.set_file(slot, file);
            s.status = None;
        });
        self.handler.on_event(&ChatEvent::AttachmentSet {
            slot,
            file_name: name.as_deref(),
        });
    }

    /// Read a file from disk into `slot`. On failure the slot keeps its
    /// previous content and the error is shown in the status line.
    pub async fn attach_path(&self, slot: Slot, path: impl AsRef<Path>) -> bool {
        match Attachment::from_path(path).await {
            Ok(att) => {
                self.set_file(slot, Some(att));
                true
            }
            Err(e) => {
                warn!("Could not attach {slot}: {e}");
                with_state!(self.state, |s| { s.status = Some(e.to_string()) });
                false
            }
        }
    }

    pub fn clear_files(&self) {
        for slot in Slot::ALL {
            self.set_file(slot, None);
        }
    }

    // ── Submission ────────────────────────────────────────────────

    /// Validate, append the user's entry and compose the request.
    ///
    /// On [`SubmitStart::Started`] the controller is in
    /// [`Phase::AwaitingResponse`] and the caller must eventually call
    /// [`settle`](Self::settle).
    pub fn begin_submit(&self, question: &str) -> SubmitStart {
        let start = {
            let mut s = self.lock();
            if s.phase == Phase::AwaitingResponse {
                SubmitStart::Busy
            } else {
                match compose(&self.identity, question, s.selector.active_mode(), &s.attachments) {
                    None => SubmitStart::Dropped,
                    Some(request) => {
                        s.transcript.append(Speaker::User, request.question.clone());
                        s.phase = Phase::AwaitingResponse;
                        s.status = None;
                        SubmitStart::Started(request)
                    }
                }
            }
        };

        match &start {
            SubmitStart::Dropped => self.handler.on_event(&ChatEvent::QuestionDropped),
            SubmitStart::Busy => self.handler.on_event(&ChatEvent::SubmitRejected {
                reason: RejectReason::Busy,
            }),
            SubmitStart::Started(request) => {
                self.handler.on_event(&ChatEvent::RequestSent { request })
            }
        }
        start
    }

    /// Record the outcome of the in-flight call: append the bot entry,
    /// clear the input draft and return to idle.
    ///
    /// Returns `None` and changes nothing when no question is in flight.
    pub fn settle(&self, result: Result<ServerReply, TransportError>) -> Option<TranscriptEntry> {
        let entry = TranscriptEntry::bot(reply_text(&result));
        {
            let mut s = self.lock();
            if s.phase != Phase::AwaitingResponse {
                drop(s);
                debug!("Ignoring a reply with no question in flight");
                return None;
            }
            s.transcript.append(entry.speaker, entry.text.clone());
            s.input.clear();
            s.phase = Phase::Idle;
        }
        if let Err(ref e) = result {
            warn!("Question failed: {e}");
        }
        self.handler.on_event(&ChatEvent::Settled { entry: &entry });
        Some(entry)
    }

    /// Submit `question` and wait for it to settle.
    pub async fn submit(&self, question: &str) -> SubmitOutcome {
        let request = match self.begin_submit(question) {
            SubmitStart::Dropped => return SubmitOutcome::Dropped,
            SubmitStart::Busy => return SubmitOutcome::Busy,
            SubmitStart::Started(request) => request,
        };
        let result = self.transport.send(&request).await;
        // `None` means another caller settled first.
        self.settle(result)
            .map_or(SubmitOutcome::Dropped, SubmitOutcome::Answered)
    }

    /// Submit whatever is in the input draft.
    pub async fn submit_input(&self) -> SubmitOutcome {
        let draft = self.lock().input.clone();
        self.submit(&draft).await
    }

    // ── Conversation reset ────────────────────────────────────────

    /// Ask the server to forget the conversation. The local transcript is
    /// kept; the server's acknowledgement is appended as a bot entry.
    pub async fn end_conversation(&self) -> Option<TranscriptEntry> {
        {
            let mut s = self.lock();
            if s.phase == Phase::AwaitingResponse {
                drop(s);
                self.handler.on_event(&ChatEvent::SubmitRejected {
                    reason: RejectReason::Busy,
                });
                return None;
            }
            s.phase = Phase::AwaitingResponse;
        }

        debug!("Ending conversation");
        let result = self.transport.end_conversation().await;
        if let Err(ref e) = result {
            warn!("Conversation reset failed: {e}");
        }
        let text = match result {
            Ok(ServerReply::Answer(Some(msg))) => msg,
            Ok(ServerReply::Answer(None)) => "Conversation ended.".to_string(),
            other => reply_text(&other),
        };
        let entry = TranscriptEntry::bot(text);
        with_state!(self.state, |s| {
            s.transcript.append(entry.speaker, entry.text.clone());
            s.phase = Phase::Idle;
        });
        self.handler
            .on_event(&ChatEvent::ConversationEnded { entry: &entry });
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::FnEventHandler;
    use crate::request::FormField;
    use crate::transport::TransportFuture;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted transport that records what it was asked to send.
    #[derive(Default)]
    struct MockTransport {
        replies: Mutex<VecDeque<Result<ServerReply, TransportError>>>,
        sent: Mutex<Vec<PendingRequest>>,
        resets: AtomicUsize,
    }

    impl MockTransport {
        fn replying(replies: Vec<Result<ServerReply, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<PendingRequest> {
            self.sent.lock().unwrap().clone()
        }

        fn next(&self) -> Result<ServerReply, TransportError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(ServerReply::Answer(None)))
        }
    }

    impl Transport for MockTransport {
        fn send<'a>(&'a self, request: &'a PendingRequest) -> TransportFuture<'a, ServerReply> {
            Box::pin(async move {
                self.sent.lock().unwrap().push(request.clone());
                self.next()
            })
        }

        fn end_conversation(&self) -> TransportFuture<'_, ServerReply> {
            Box::pin(async move {
                self.resets.fetch_add(1, Ordering::SeqCst);
                self.next()
            })
        }
    }

    fn answer(text: &str) -> Result<ServerReply, TransportError> {
        Ok(ServerReply::Answer(Some(text.to_string())))
    }

    fn entries(c: &ChatController<MockTransport>) -> Vec<TranscriptEntry> {
        crate::ui::transcript_snapshot(c.state())
    }

    #[tokio::test]
    async fn whitespace_question_is_dropped() {
        let c = ChatController::new(MockTransport::default());
        for q in ["", "   ", "\t\n"] {
            assert_eq!(c.submit(q).await, SubmitOutcome::Dropped);
        }
        assert!(entries(&c).is_empty());
        assert!(c.transport().sent().is_empty());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn answer_appended_after_user_entry() {
        let c = ChatController::new(MockTransport::replying(vec![answer("X")]));
        let outcome = c.submit("  What is X?  ").await;

        assert_eq!(outcome, SubmitOutcome::Answered(TranscriptEntry::bot("X")));
        assert_eq!(
            entries(&c),
            vec![TranscriptEntry::user("What is X?"), TranscriptEntry::bot("X")]
        );
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn missing_answer_uses_placeholder() {
        let c = ChatController::new(MockTransport::replying(vec![Ok(ServerReply::Answer(None))]));
        c.submit("q").await;
        assert_eq!(entries(&c)[1], TranscriptEntry::bot(NO_ANSWER_TEXT));
    }

    #[tokio::test]
    async fn application_error_is_prefixed() {
        let c = ChatController::new(MockTransport::replying(vec![Ok(ServerReply::Error(
            "bad input".into(),
        ))]));
        c.submit("q").await;
        let all = entries(&c);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1], TranscriptEntry::bot("Error: bad input"));
    }

    #[tokio::test]
    async fn transport_failure_uses_fixed_message() {
        let c = ChatController::new(MockTransport::replying(vec![Err(TransportError::Status {
            status: 502,
            body: "Bad Gateway".into(),
        })]));
        c.submit("q").await;
        let all = entries(&c);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1], TranscriptEntry::bot(UNREACHABLE_TEXT));

        // Still usable afterwards.
        c.submit("again").await;
        assert_eq!(entries(&c).len(), 4);
    }

    #[test]
    fn user_entry_visible_before_settlement() {
        let c = ChatController::new(MockTransport::default());
        let start = c.begin_submit("hello");
        assert!(matches!(start, SubmitStart::Started(_)));
        assert_eq!(entries(&c), vec![TranscriptEntry::user("hello")]);
        assert_eq!(c.phase(), Phase::AwaitingResponse);

        c.settle(answer("hi"));
        assert_eq!(entries(&c).len(), 2);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn settle_without_question_in_flight_is_ignored() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let c = ChatController::new(MockTransport::default()).with_event_handler(
            FnEventHandler(move |event: &ChatEvent<'_>| {
                if matches!(event, ChatEvent::Settled { .. }) {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );
        crate::ui::set_input(c.state(), "draft");

        assert_eq!(c.settle(answer("stray")), None);
        assert!(entries(&c).is_empty());
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.state().lock().unwrap().input, "draft");

        // A second settle after the real one is also a no-op.
        c.begin_submit("q");
        assert_eq!(c.settle(answer("a")), Some(TranscriptEntry::bot("a")));
        assert_eq!(c.settle(answer("late")), None);
        assert_eq!(entries(&c).len(), 2);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_submit_while_awaiting_is_rejected() {
        let c = ChatController::new(MockTransport::default());
        assert!(matches!(c.begin_submit("first"), SubmitStart::Started(_)));
        assert_eq!(c.begin_submit("second"), SubmitStart::Busy);
        assert_eq!(entries(&c).len(), 1);

        c.settle(answer("one"));
        assert!(matches!(c.begin_submit("second"), SubmitStart::Started(_)));
    }

    #[test]
    fn settle_clears_input_regardless_of_outcome() {
        let c = ChatController::new(MockTransport::default());
        for result in [
            answer("ok"),
            Ok(ServerReply::Error("no".into())),
            Err(TransportError::Malformed("x".into())),
        ] {
            crate::ui::set_input(c.state(), "typed");
            c.begin_submit("typed");
            c.settle(result);
            assert!(c.state().lock().unwrap().input.is_empty());
        }
    }

    #[tokio::test]
    async fn submit_input_uses_draft() {
        let c = ChatController::new(MockTransport::replying(vec![answer("sure")]));
        crate::ui::set_input(c.state(), " from draft ");
        c.submit_input().await;
        assert_eq!(c.transport().sent()[0].question, "from draft");
        assert!(c.state().lock().unwrap().input.is_empty());
    }

    #[tokio::test]
    async fn mode_one_sends_first_slot_only() {
        let c = ChatController::new(MockTransport::replying(vec![answer("a")]));
        c.select_mode("1").unwrap();
        c.set_file(Slot::First, Some(Attachment::from_bytes("x.pdf", "pdf")));
        c.submit("What is X?").await;

        let sent = c.transport().sent();
        let names: Vec<&str> = sent[0].form_fields().iter().map(FormField::name).collect();
        assert_eq!(names, vec!["username", "question", "option", "uploaded_file1"]);
        assert_eq!(sent[0].option, "1");
        assert_eq!(sent[0].identity, "anonymous_user");
    }

    #[tokio::test]
    async fn mode_two_withholds_but_keeps_files() {
        let c = ChatController::new(MockTransport::replying(vec![answer("a"), answer("b")]));
        c.set_file(Slot::First, Some(Attachment::from_bytes("a.pdf", "a")));
        c.set_file(Slot::Second, Some(Attachment::from_bytes("b.pdf", "b")));

        assert!(!c.select_mode("2").unwrap());
        c.submit("Summarize").await;
        assert!(c.transport().sent()[0].attachments.is_empty());
        assert_eq!(c.transport().sent()[0].option, "2");

        // Switching back sends the files chosen earlier.
        assert!(c.select_mode("3").unwrap());
        c.submit("And now?").await;
        assert_eq!(c.transport().sent()[1].attachments.len(), 2);
    }

    #[test]
    fn unknown_mode_rejected_and_reported() {
        let c = ChatController::new(MockTransport::default());
        c.select_mode("4").unwrap();
        let err = c.select_mode("nine").unwrap_err();
        assert_eq!(err, ModeError::UnknownMode("nine".into()));

        let s = c.state().lock().unwrap();
        assert_eq!(s.selector.active_mode().id, "4");
        assert_eq!(s.status.as_deref(), Some("unknown mode: nine"));
    }

    #[test]
    fn visibility_follows_mode() {
        let c = ChatController::new(MockTransport::default());
        for (id, visible) in [("1", true), ("2", false), ("3", true), ("4", true)] {
            c.select_mode(id).unwrap();
            assert_eq!(c.state().lock().unwrap().attachments_visible(), visible);
        }
        assert_eq!(c.cycle_mode(false), "3");
    }

    #[test]
    fn mode_changes_while_awaiting_do_not_touch_request() {
        let c = ChatController::new(MockTransport::default());
        let SubmitStart::Started(request) = c.begin_submit("q") else {
            panic!("expected start");
        };
        c.select_mode("2").unwrap();
        assert_eq!(request.option, "1");
        assert_eq!(c.phase(), Phase::AwaitingResponse);
    }

    #[tokio::test]
    async fn attach_path_failure_keeps_slot() {
        let c = ChatController::new(MockTransport::default());
        c.set_file(Slot::First, Some(Attachment::from_bytes("keep.txt", "k")));

        let dir = tempfile::tempdir().unwrap();
        assert!(!c.attach_path(Slot::First, dir.path().join("missing.txt")).await);

        let s = c.state().lock().unwrap();
        assert_eq!(s.attachments.file(Slot::First).unwrap().file_name, "keep.txt");
        assert!(s.status.as_deref().unwrap().contains("missing.txt"));
    }

    #[tokio::test]
    async fn attach_path_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let c = ChatController::new(MockTransport::default());
        assert!(c.attach_path(Slot::Second, &path).await);
        assert_eq!(
            c.state()
                .lock()
                .unwrap()
                .attachments
                .file(Slot::Second)
                .unwrap()
                .mime_type,
            "application/pdf"
        );

        c.clear_files();
        assert!(c.state().lock().unwrap().attachments.is_empty());
    }

    #[tokio::test]
    async fn end_conversation_appends_server_message() {
        let c = ChatController::new(MockTransport::replying(vec![
            answer("first"),
            answer("Conversation ended and in-memory caches cleared."),
        ]));
        c.submit("q").await;
        let entry = c.end_conversation().await.unwrap();
        assert_eq!(entry.text, "Conversation ended and in-memory caches cleared.");
        assert_eq!(entries(&c).len(), 3);
        assert_eq!(c.transport().resets.load(Ordering::SeqCst), 1);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn end_conversation_failure_is_reported() {
        let c = ChatController::new(MockTransport::replying(vec![Err(
            TransportError::Malformed("x".into()),
        )]));
        let entry = c.end_conversation().await.unwrap();
        assert_eq!(entry.text, UNREACHABLE_TEXT);
    }

    #[tokio::test]
    async fn end_conversation_rejected_while_awaiting() {
        let c = ChatController::new(MockTransport::default());
        c.begin_submit("q");
        assert!(c.end_conversation().await.is_none());
        assert_eq!(c.transport().resets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn events_reach_handler() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let c = ChatController::new(MockTransport::replying(vec![answer("a")]))
            .with_identity("tester")
            .with_event_handler(FnEventHandler(move |e: &ChatEvent<'_>| {
                if matches!(e, ChatEvent::RequestSent { .. } | ChatEvent::Settled { .. }) {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            }));
        c.submit("q").await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(c.transport().sent()[0].identity, "tester");
    }

    #[test]
    fn reply_text_table() {
        assert_eq!(reply_text(&answer("X")), "X");
        assert_eq!(reply_text(&answer("")), NO_ANSWER_TEXT);
        assert_eq!(
            reply_text(&Ok(ServerReply::Error("bad input".into()))),
            "Error: bad input"
        );
        assert_eq!(
            reply_text(&Err(TransportError::Build("x".into()))),
            UNREACHABLE_TEXT
        );
    }
}
