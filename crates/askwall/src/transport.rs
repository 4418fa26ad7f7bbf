//! The network seam: how a [`PendingRequest`] reaches the server.
//!
//! [`Transport`] is the capability the controller depends on.
//! [`HttpTransport`] is the real implementation: a multipart `POST` over
//! reqwest. Tests substitute their own transport.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::request::{FormField, PendingRequest};

/// Boxed future returned by [`Transport`] methods, so the trait stays
/// dyn-compatible.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send + 'a>>;

/// Response key carrying the answer to a question.
pub const ANSWER_KEY: &str = "answer";
/// Response key carrying the acknowledgement of a conversation reset.
pub const MESSAGE_KEY: &str = "message";
/// Response key carrying an application error.
pub const ERROR_KEY: &str = "error";

/// Failures that mean no usable reply arrived.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A reply the server produced on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerReply {
    /// Success. The text may be missing or empty.
    Answer(Option<String>),
    /// The server rejected or failed the question and said why.
    Error(String),
}

/// Issues requests to the assistant server.
pub trait Transport: Send + Sync {
    /// Send one question.
    fn send<'a>(&'a self, request: &'a PendingRequest) -> TransportFuture<'a, ServerReply>;

    /// Ask the server to forget the conversation so far.
    fn end_conversation(&self) -> TransportFuture<'_, ServerReply>;
}

/// Turn a raw HTTP reply into a [`ServerReply`].
///
/// A JSON object with a truthy `error` value is an application error
/// whatever the status code (see [`error_text`]). Any other JSON object is a success on a 2xx
/// status, with the text taken from `answer_key`. Everything else is a
/// transport failure.
pub fn parse_reply(status: u16, body: &str, answer_key: &str) -> Result<ServerReply, TransportError> {
    let success = (200..300).contains(&status);

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) if !success => {
            return Err(TransportError::Status {
                status,
                body: body.to_string(),
            });
        }
        Err(e) => return Err(TransportError::Parse(e)),
    };

    let Some(obj) = value.as_object() else {
        return Err(TransportError::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    };

    if let Some(err) = obj.get(ERROR_KEY).and_then(error_text) {
        return Ok(ServerReply::Error(err));
    }

    if !success {
        return Err(TransportError::Status {
            status,
            body: body.to_string(),
        });
    }

    let text = obj
        .get(answer_key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Ok(ServerReply::Answer(text))
}

/// Display text for an `error` value the server considers set.
///
/// `null`, `false`, `0` and `""` count as unset. Strings are used as-is and
/// any other value is shown as compact JSON.
pub fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── HTTP ───────────────────────────────────────────────────────────

/// Multipart-over-HTTP transport.
pub struct HttpTransport {
    client: reqwest::Client,
    chat_url: String,
    end_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        config.validate().map_err(TransportError::Build)?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self {
            client,
            chat_url: config.chat_url(),
            end_url: config.end_url(),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    async fn post(&self, url: &str, form: Form, answer_key: &str) -> Result<ServerReply, TransportError> {
        let start = Instant::now();
        let resp = self.client.post(url).multipart(form).send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(
            "Server response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );
        trace!("Response body: {}", text);

        parse_reply(status.as_u16(), &text, answer_key)
    }
}

/// Convert the transport-independent field list into a reqwest form.
pub fn build_form(request: &PendingRequest) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for field in request.form_fields() {
        form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File { name, attachment } => {
                let part = Part::bytes(attachment.bytes.to_vec())
                    .file_name(attachment.file_name.clone())
                    .mime_str(&attachment.mime_type)?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

impl Transport for HttpTransport {
    fn send<'a>(&'a self, request: &'a PendingRequest) -> TransportFuture<'a, ServerReply> {
        Box::pin(async move {
            debug!(
                "Chat request: option={}, question={} chars, attachments={} ({} bytes)",
                request.option,
                request.question.chars().count(),
                request.attachments.len(),
                request.attachment_bytes(),
            );
            let form = build_form(request)?;
            self.post(&self.chat_url, form, ANSWER_KEY).await
        })
    }

    fn end_conversation(&self) -> TransportFuture<'_, ServerReply> {
        Box::pin(async move {
            debug!("End-conversation request");
            self.post(&self.end_url, Form::new(), MESSAGE_KEY).await
        })
    }
}
