//! Tracing layer that feeds the log pane.
//!
//! [`UiTracingLayer`] turns events into [`LogLine`]s and parks them in a
//! [`LogBuffer`]; the frontend drains the buffer into
//! [`ChatState::logs`](super::ChatState) once per frame. The buffer has its
//! own mutex, so a tokio worker that logs never waits on the render thread.
//!
//! Events from askwall crates are kept at every level. Events from other
//! targets (reqwest, hyper and friends) are kept only at
//! [`UiTracingLayer::with_foreign_level`] or above, `INFO` by default.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::{LOG_TRIM_TO, LogLevel, LogLine, MAX_LOG_LINES, SharedChatState};

/// Target prefix of events that always reach the log pane.
const OWN_TARGET: &str = "askwall";

impl From<&Level> for LogLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::TRACE => Self::Trace,
            Level::DEBUG => Self::Debug,
            Level::INFO => Self::Info,
            Level::WARN => Self::Warn,
            Level::ERROR => Self::Error,
        }
    }
}

/// Log lines waiting for the next frame.
#[derive(Clone)]
pub struct LogBuffer(Arc<Mutex<Vec<LogLine>>>);

impl LogBuffer {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::with_capacity(128))))
    }

    fn push(&self, line: LogLine) {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        buf.push(line);
        cap(&mut buf);
    }

    /// Take every pending line.
    pub fn drain(&self) -> Vec<LogLine> {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *buf)
    }

    /// Move pending lines into `ChatState::logs`. The chat state is locked
    /// only when there is something to move.
    pub fn flush_into(&self, state: &SharedChatState) {
        let lines = self.drain();
        if lines.is_empty() {
            return;
        }
        if let Ok(mut s) = state.lock() {
            s.logs.extend(lines);
            cap(&mut s.logs);
        }
    }
}

/// Past `MAX_LOG_LINES`, keep only the newest `LOG_TRIM_TO`.
fn cap(logs: &mut Vec<LogLine>) {
    if logs.len() > MAX_LOG_LINES {
        let excess = logs.len() - LOG_TRIM_TO;
        logs.drain(..excess);
    }
}

/// Captures tracing events into a [`LogBuffer`].
pub struct UiTracingLayer {
    buffer: LogBuffer,
    foreign_level: Level,
}

impl UiTracingLayer {
    /// Create the layer and the buffer a frontend drains each frame.
    pub fn new() -> (Self, LogBuffer) {
        let buffer = LogBuffer::new();
        let layer = Self {
            buffer: buffer.clone(),
            foreign_level: Level::INFO,
        };
        (layer, buffer)
    }

    /// Least severe level kept for events outside askwall crates.
    pub fn with_foreign_level(mut self, level: Level) -> Self {
        self.foreign_level = level;
        self
    }

    fn keeps(&self, target: &str, level: &Level) -> bool {
        target.starts_with(OWN_TARGET) || *level <= self.foreign_level
    }
}

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for UiTracingLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if !self.keeps(meta.target(), meta.level()) {
            return;
        }

        let mut text = EventText::default();
        event.record(&mut text);

        self.buffer.push(LogLine {
            time: Local::now().format("%H:%M:%S").to_string(),
            level: meta.level().into(),
            message: text.into_message(),
        });
    }
}

/// Message and extra fields of one event.
#[derive(Default)]
struct EventText {
    message: String,
    fields: Vec<String>,
}

impl EventText {
    /// `message {k=v, ...}`, or just the fields when there is no message.
    fn into_message(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields.join(" "),
            (false, false) => format!("{} {{{}}}", self.message, self.fields.join(", ")),
        }
    }
}

impl Visit for EventText {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            // format_args! messages arrive here; Debug on them is the plain text.
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ChatState;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn captures_events_into_buffer() {
        let (layer, buffer) = UiTracingLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("question sent");
            tracing::warn!(slot = 2, "unsupported file");
            tracing::debug!(path = "a.pdf");
        });

        let lines = buffer.drain();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].level, LogLevel::Info);
        assert_eq!(lines[0].message, "question sent");
        assert_eq!(lines[1].level, LogLevel::Warn);
        assert_eq!(lines[1].message, "unsupported file {slot=2}");
        assert_eq!(lines[2].message, "path=a.pdf");
        assert!(buffer.drain().is_empty());
    }

    #[test]
    fn foreign_targets_need_the_threshold() {
        let (layer, buffer) = UiTracingLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer.with_foreign_level(Level::WARN));

        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!(target: "hyper_util::client", "pooling idle connection");
            tracing::info!(target: "reqwest::connect", "starting new connection");
            tracing::warn!(target: "reqwest::connect", "connection reset");
            tracing::trace!(target: "askwall::transport", "response body");
        });

        let messages: Vec<String> = buffer.drain().into_iter().map(|l| l.message).collect();
        assert_eq!(messages, vec!["connection reset", "response body"]);
    }

    #[test]
    fn flush_into_moves_lines_to_state() {
        let (layer, buffer) = UiTracingLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);
        let state = ChatState::default().into_shared();

        buffer.flush_into(&state);
        assert!(state.lock().unwrap().logs.is_empty());

        tracing::subscriber::with_default(subscriber, || {
            for i in 0..(MAX_LOG_LINES + 5) {
                tracing::error!("line {i}");
            }
        });
        buffer.flush_into(&state);

        let s = state.lock().unwrap();
        assert!(s.logs.len() <= MAX_LOG_LINES);
        assert_eq!(s.logs.last().unwrap().message, format!("line {}", MAX_LOG_LINES + 4));
    }
}
