//! Interactive terminal chat with the StackWalls assistant.
//!
//! `askwall-chat` wires an askwall [`ChatController`] to the askwall-tui
//! terminal UI. The TUI sends [`UiCommand`]s; [`dispatch`] applies each
//! one to the controller. Network calls run on their own tokio task so mode
//! and attachment changes keep working while a question is in flight.
//!
//! # Binary
//!
//! ```sh
//! askwall-chat --base-url http://127.0.0.1:5000 --mode 3
//! ```

pub mod config;

use std::sync::Arc;

use askwall::controller::{ChatController, SubmitStart};
use askwall::transport::Transport;
use askwall_tui::UiCommand;
use tokio::task::JoinHandle;

pub use config::ChatAppConfig;

/// What the command loop should do after a command.
#[derive(Debug)]
pub enum Flow {
    Continue,
    /// Keep going; the command started background work.
    Spawned(JoinHandle<()>),
    Quit,
}

/// Apply one UI command to the controller.
///
/// Submission is split: the user's entry is appended right here, and only
/// the network call plus settlement run on a spawned task.
pub fn dispatch<T: Transport + 'static>(controller: &Arc<ChatController<T>>, cmd: UiCommand) -> Flow {
    match cmd {
        UiCommand::SelectMode(id) => {
            // Rejections already land in the status line.
            let _ = controller.select_mode(&id);
        }
        UiCommand::CycleMode { forward } => {
            controller.cycle_mode(forward);
        }
        UiCommand::ClearAttachments => controller.clear_files(),
        UiCommand::AttachPath { slot, path } => {
            let c = Arc::clone(controller);
            return Flow::Spawned(tokio::spawn(async move {
                c.attach_path(slot, path).await;
            }));
        }
        UiCommand::Submit(text) => {
            if let SubmitStart::Started(request) = controller.begin_submit(&text) {
                let c = Arc::clone(controller);
                return Flow::Spawned(tokio::spawn(async move {
                    let result = c.transport().send(&request).await;
                    c.settle(result);
                }));
            }
        }
        UiCommand::EndConversation => {
            let c = Arc::clone(controller);
            return Flow::Spawned(tokio::spawn(async move {
                c.end_conversation().await;
            }));
        }
        UiCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}
