//! Client for the StackWalls assistant: ask questions under a mode, attach
//! up to two documents, and keep a running transcript of the answers.
//!
//! The crate is frontend-agnostic. The [`ChatController`](controller::ChatController)
//! owns every state transition and writes into a shared
//! [`ChatState`](ui::ChatState) that a terminal UI, a one-shot CLI or a test
//! reads from. The network sits behind the [`Transport`](transport::Transport)
//! trait; [`HttpTransport`](transport::HttpTransport) is the multipart-over-HTTP
//! implementation.
//!
//! # Getting started
//!
//! ```ignore
//! use askwall::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), TransportError> {
//!     let config = ClientConfig::default().with_base_url("http://127.0.0.1:5000");
//!     let transport = HttpTransport::new(&config)?;
//!     let controller = ChatController::new(transport)
//!         .with_identity(config.identity.clone())
//!         .with_event_handler(LoggingHandler);
//!
//!     controller.select_mode("2").ok();
//!     if let SubmitOutcome::Answered(entry) = controller.submit("What does StackWalls do?").await {
//!         println!("{}", entry.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`mode`] | [`ModeCatalog`](mode::ModeCatalog) and the active-mode [`ModeSelector`](mode::ModeSelector) |
//! | [`attachment`] | The two attachment [`Slot`](attachment::Slot)s and their contents |
//! | [`transcript`] | Append-only user/bot [`Transcript`](transcript::Transcript) |
//! | [`request`] | [`compose`](request::compose) a [`PendingRequest`](request::PendingRequest) from the current state |
//! | [`transport`] | [`Transport`](transport::Transport) seam, reply parsing, HTTP implementation |
//! | [`controller`] | [`ChatController`](controller::ChatController) state machine |
//! | [`events`] | [`EventHandler`](events::EventHandler) observers |
//! | [`config`] | [`ClientConfig`](config::ClientConfig) endpoints, identity, timeout |
//! | [`ui`] | Shared [`ChatState`](ui::ChatState) and the tracing capture layer |

pub mod attachment;
pub mod config;
pub mod controller;
pub mod events;
pub mod mode;
pub mod prelude;
pub mod request;
pub mod transcript;
pub mod transport;
pub mod ui;
