//! TUI-local state (not shared with the controller).

use askwall::attachment::Slot;

/// Input mode for the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputMode {
    /// Normal mode: digits pick a mode, arrow keys scroll, `q` quits.
    Normal,
    /// Typing a question into `ChatState::input`. Enter sends, Esc leaves.
    Question,
    /// Typing a file path for an attachment slot.
    AttachPath(Slot),
}

/// Which pane currently receives scroll input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ActivePane {
    Log,
    Transcript,
}

pub(crate) struct App {
    pub(crate) input_mode: InputMode,
    /// Path being typed in `AttachPath` mode. The question draft lives in
    /// the shared state instead.
    pub(crate) path_buffer: String,
    /// Which pane is focused for scrolling (toggled with Tab).
    pub(crate) active_pane: ActivePane,
    /// Whether the logs pane is visible (toggled with `,`).
    pub(crate) show_logs: bool,
    /// Offset from the bottom of the log (0 = follow tail).
    pub(crate) log_scroll: usize,
    /// Offset from the bottom of the transcript (0 = follow tail).
    pub(crate) transcript_scroll: usize,
    /// Hint shown in the input bar until the next key press.
    pub(crate) status_message: Option<String>,
    pub(crate) should_quit: bool,
}

impl App {
    pub(crate) fn new(show_logs: bool) -> Self {
        Self {
            input_mode: InputMode::Normal,
            path_buffer: String::new(),
            active_pane: ActivePane::Transcript,
            show_logs,
            log_scroll: 0,
            transcript_scroll: 0,
            status_message: None,
            should_quit: false,
        }
    }
}
