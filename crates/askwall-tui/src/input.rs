//! Key handling for the chat TUI.

use std::path::PathBuf;

use askwall::attachment::Slot;
use askwall::ui::SharedChatState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{ActivePane, App, InputMode};
use crate::command::{CommandSender, UiCommand};

const WAITING_HINT: &str = "Waiting for the answer...";
const NO_ATTACHMENTS_HINT: &str = "This mode takes no attachments.";

pub(crate) fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    state: &SharedChatState,
    commands: &CommandSender,
) {
    // Ctrl+C always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        quit(app, commands);
        return;
    }

    app.status_message = None;
    match app.input_mode {
        InputMode::Normal => handle_normal_key(key, app, state, commands),
        InputMode::Question => handle_question_key(key, app, state, commands),
        InputMode::AttachPath(slot) => handle_path_key(key, app, slot, commands),
    }
}

fn send(app: &mut App, commands: &CommandSender, cmd: UiCommand) {
    // A closed channel means the command loop is gone.
    if commands.send(cmd).is_err() {
        app.should_quit = true;
    }
}

fn quit(app: &mut App, commands: &CommandSender) {
    let _ = commands.send(UiCommand::Quit);
    app.should_quit = true;
}

fn is_awaiting(state: &SharedChatState) -> bool {
    state.lock().map(|s| s.is_awaiting()).unwrap_or(false)
}

fn attachments_visible(state: &SharedChatState) -> bool {
    state.lock().map(|s| s.attachments_visible()).unwrap_or(false)
}

fn handle_normal_key(key: KeyEvent, app: &mut App, state: &SharedChatState, commands: &CommandSender) {
    match key.code {
        KeyCode::Char('q') => quit(app, commands),
        KeyCode::Char(c @ '1'..='9') => send(app, commands, UiCommand::SelectMode(c.to_string())),
        KeyCode::Left => send(app, commands, UiCommand::CycleMode { forward: false }),
        KeyCode::Right => send(app, commands, UiCommand::CycleMode { forward: true }),
        KeyCode::Char('i') | KeyCode::Enter => {
            if is_awaiting(state) {
                app.status_message = Some(WAITING_HINT.into());
            } else {
                app.input_mode = InputMode::Question;
            }
        }
        KeyCode::Char(c @ ('a' | 'b')) => {
            if attachments_visible(state) {
                let slot = if c == 'a' { Slot::First } else { Slot::Second };
                app.path_buffer.clear();
                app.input_mode = InputMode::AttachPath(slot);
            } else {
                app.status_message = Some(NO_ATTACHMENTS_HINT.into());
            }
        }
        KeyCode::Char('x') => send(app, commands, UiCommand::ClearAttachments),
        KeyCode::Char('e') => {
            if is_awaiting(state) {
                app.status_message = Some(WAITING_HINT.into());
            } else {
                send(app, commands, UiCommand::EndConversation);
            }
        }
        KeyCode::Char(',') => {
            app.show_logs = !app.show_logs;
            app.active_pane = if app.show_logs {
                ActivePane::Log
            } else {
                ActivePane::Transcript
            };
        }
        KeyCode::Tab | KeyCode::BackTab => switch_pane(app),
        _ => scroll(key.code, app),
    }
}

fn handle_question_key(
    key: KeyEvent,
    app: &mut App,
    state: &SharedChatState,
    commands: &CommandSender,
) {
    match key.code {
        KeyCode::Enter => {
            if is_awaiting(state) {
                app.status_message = Some(WAITING_HINT.into());
                return;
            }
            let draft = state.lock().map(|s| s.input.clone()).unwrap_or_default();
            app.input_mode = InputMode::Normal;
            send(app, commands, UiCommand::Submit(draft));
        }
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            if let Ok(mut s) = state.lock() {
                s.input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Ok(mut s) = state.lock() {
                s.input.push(c);
            }
        }
        KeyCode::Tab | KeyCode::BackTab => switch_pane(app),
        // Navigation keys pass through so the user can scroll while typing.
        other => scroll(other, app),
    }
}

fn handle_path_key(key: KeyEvent, app: &mut App, slot: Slot, commands: &CommandSender) {
    match key.code {
        KeyCode::Enter => {
            let path = app.path_buffer.trim().to_string();
            app.path_buffer.clear();
            app.input_mode = InputMode::Normal;
            if path.is_empty() {
                app.status_message = Some("No path given.".into());
                return;
            }
            send(
                app,
                commands,
                UiCommand::AttachPath {
                    slot,
                    path: PathBuf::from(path),
                },
            );
        }
        KeyCode::Esc => {
            app.path_buffer.clear();
            app.input_mode = InputMode::Normal;
            app.status_message = Some("Attachment cancelled.".into());
        }
        KeyCode::Backspace => {
            app.path_buffer.pop();
        }
        KeyCode::Char(c) => app.path_buffer.push(c),
        _ => {}
    }
}

fn switch_pane(app: &mut App) {
    if app.show_logs {
        app.active_pane = match app.active_pane {
            ActivePane::Log => ActivePane::Transcript,
            ActivePane::Transcript => ActivePane::Log,
        };
    }
}

fn scroll(code: KeyCode, app: &mut App) {
    let offset = match app.active_pane {
        ActivePane::Log => &mut app.log_scroll,
        ActivePane::Transcript => &mut app.transcript_scroll,
    };
    match code {
        KeyCode::Up | KeyCode::Char('k') => *offset = offset.saturating_add(3),
        KeyCode::Down | KeyCode::Char('j') => *offset = offset.saturating_sub(3),
        KeyCode::PageUp => *offset = offset.saturating_add(20),
        KeyCode::PageDown => *offset = offset.saturating_sub(20),
        KeyCode::End => *offset = 0, // follow tail
        _ => {}
    }
}
