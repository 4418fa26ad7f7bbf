//! Terminal rendition of the askwall assistant widget.
//!
//! Renders [`ChatState`](askwall::ui::ChatState) with ratatui + crossterm
//! and turns key presses into [`UiCommand`]s. The TUI never talks to the
//! network: whoever owns the [`ChatController`](askwall::controller::ChatController)
//! drains the command channel and the TUI picks up the results from the
//! shared state on the next frame.
//!
//! # Quick start
//!
//! ```ignore
//! use askwall::ui::ChatState;
//! use askwall_tui::{TuiConfig, command_channel, spawn_tui};
//!
//! let state = ChatState::default().into_shared();
//! let (tx, mut rx) = command_channel();
//! let handle = spawn_tui(state.clone(), TuiConfig::new(tx));
//! // ... receive commands from `rx` and hand them to a controller ...
//! handle.join().unwrap();
//! ```

use std::io;
use std::thread::JoinHandle;
use std::time::Duration;

use askwall::ui::tracing::LogBuffer;
use askwall::ui::{SharedChatState, request_quit};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use ratatui::prelude::*;

mod app;
mod command;
mod input;
mod render;

pub use command::{CommandReceiver, CommandSender, UiCommand, command_channel};
pub use render::{format_size, log_level_style};

use app::App;
use input::handle_key_event;
use render::render;

/// Configuration for the TUI.
pub struct TuiConfig {
    /// Where user actions are sent.
    pub commands: CommandSender,
    /// Optional log buffer from the tracing layer.
    ///
    /// When set, the TUI drains pending log lines from this buffer once
    /// per frame and merges them into `ChatState::logs`. The tracing layer
    /// never touches the chat state lock itself.
    pub log_buffer: Option<LogBuffer>,
    /// Open with the logs pane visible.
    pub show_logs: bool,
}

impl TuiConfig {
    pub fn new(commands: CommandSender) -> Self {
        Self {
            commands,
            log_buffer: None,
            show_logs: false,
        }
    }

    pub fn with_log_buffer(mut self, buffer: LogBuffer) -> Self {
        self.log_buffer = Some(buffer);
        self
    }

    pub fn with_show_logs(mut self, show: bool) -> Self {
        self.show_logs = show;
        self
    }
}

/// Spawn the TUI on a dedicated OS thread.
///
/// The TUI runs until the user quits or `quit_requested` is set on the
/// shared state.
pub fn spawn_tui(state: SharedChatState, config: TuiConfig) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(e) = run_tui(state, &config) {
            eprintln!("TUI error: {e}");
        }
    })
}

/// Run the TUI event loop (blocking). Call this from a dedicated OS thread.
pub fn run_tui(state: SharedChatState, config: &TuiConfig) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut app = App::new(config.show_logs);

    loop {
        let quit = state.lock().map(|s| s.quit_requested).unwrap_or(true);
        if app.should_quit || quit {
            request_quit(&state);
            break;
        }

        if let Some(ref log_buf) = config.log_buffer {
            log_buf.flush_into(&state);
        }

        terminal.draw(|frame| render(frame, &state, &app))?;

        // Poll for input events (100ms timeout for responsive rendering).
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(key, &mut app, &state, &config.commands);
        }
    }

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
    terminal.show_cursor()?;
    Ok(())
}
