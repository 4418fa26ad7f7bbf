//! Commands the TUI sends to whoever owns the controller.

use std::path::PathBuf;

use askwall::attachment::Slot;

/// A user action collected by the TUI.
///
/// The TUI never calls the controller itself. It only pushes commands onto
/// an unbounded channel so the render thread never waits on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    SelectMode(String),
    CycleMode { forward: bool },
    AttachPath { slot: Slot, path: PathBuf },
    ClearAttachments,
    /// Submit the question text as typed. Blank text is dropped downstream.
    Submit(String),
    EndConversation,
    Quit,
}

pub type CommandSender = tokio::sync::mpsc::UnboundedSender<UiCommand>;
pub type CommandReceiver = tokio::sync::mpsc::UnboundedReceiver<UiCommand>;

/// Create the command channel.
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}
