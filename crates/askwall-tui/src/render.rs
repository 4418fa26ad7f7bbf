//! Rendering for the chat TUI.

use askwall::transcript::{Speaker, TranscriptEntry};
use askwall::ui::{LogLevel, LogLine, SharedChatState};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{ActivePane, App, InputMode};

// ── Public Utilities ──────────────────────────────────────────────────

/// Human-readable byte count: "512 B", "1.5 KB", "2.0 MB".
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Map a log level to a ratatui [`Style`].
pub fn log_level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Trace => Style::default().fg(Color::DarkGray),
        LogLevel::Debug => Style::default().fg(Color::Cyan),
        LogLevel::Info => Style::default().fg(Color::Green),
        LogLevel::Warn => Style::default().fg(Color::Yellow),
        LogLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

/// Scroll offset that keeps the last wrapped row at the bottom of a
/// bordered pane, `back` rows up from the tail.
fn tail_scroll(lines: &[Line<'_>], area: Rect, back: usize) -> u16 {
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2) as usize;
    // Count rows the same way the rendered paragraph wraps them.
    let rows = Paragraph::new(lines.to_vec())
        .wrap(Wrap { trim: false })
        .line_count(inner_width);
    let scroll = rows.saturating_sub(inner_height).saturating_sub(back);
    u16::try_from(scroll).unwrap_or(u16::MAX)
}

// ── Root Render ───────────────────────────────────────────────────────

struct ModeCard {
    id: String,
    title: String,
}

/// Copy of the `ChatState` fields needed for one frame, so the lock is
/// held only for the copy and never while widgets are built.
struct RenderSnapshot {
    modes: Vec<ModeCard>,
    active_mode: usize,
    attachments_visible: bool,
    files: [Option<(String, usize)>; 2],
    transcript: Vec<TranscriptEntry>,
    input: String,
    awaiting: bool,
    status: Option<String>,
    endpoint: String,
    logs: Vec<LogLine>,
}

fn snapshot(state: &SharedChatState, app: &App) -> Option<RenderSnapshot> {
    let s = state.lock().ok()?;
    let modes = s
        .selector
        .catalog()
        .modes()
        .iter()
        .map(|m| ModeCard {
            id: m.id.clone(),
            title: m.title.clone(),
        })
        .collect();
    let files = askwall::attachment::Slot::ALL.map(|slot| {
        s.attachments
            .file(slot)
            .map(|f| (f.file_name.clone(), f.len()))
    });
    Some(RenderSnapshot {
        modes,
        active_mode: s.selector.active_index(),
        attachments_visible: s.attachments_visible(),
        files,
        transcript: s.transcript.entries().to_vec(),
        input: s.input.clone(),
        awaiting: s.is_awaiting(),
        status: s.status.clone(),
        endpoint: s.endpoint.clone(),
        logs: if app.show_logs {
            s.logs.clone()
        } else {
            Vec::new()
        },
    })
    // lock released here
}

pub(crate) fn render(frame: &mut Frame, state: &SharedChatState, app: &App) {
    let Some(snap) = snapshot(state, app) else {
        return;
    };
    let area = frame.area();

    // [4] modes | [4] attachments (if shown) | [flex] middle | [3] input bar.
    let attach_height = if snap.attachments_visible { 4 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(attach_height),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    render_modes(frame, chunks[0], &snap);
    if snap.attachments_visible {
        render_attachments(frame, chunks[1], &snap);
    }

    if app.show_logs {
        let mid = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);
        render_transcript(frame, mid[0], &snap, app);
        render_logs(frame, mid[1], &snap.logs, app);
    } else {
        render_transcript(frame, chunks[2], &snap, app);
    }

    render_input(frame, chunks[3], &snap, app);
}

// ── Mode Cards ────────────────────────────────────────────────────────

fn render_modes(frame: &mut Frame, area: Rect, snap: &RenderSnapshot) {
    let mut spans = Vec::with_capacity(snap.modes.len() * 2);
    for (i, card) in snap.modes.iter().enumerate() {
        let style = if i == snap.active_mode {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" [{}] {} ", card.id, card.title), style));
        spans.push(Span::raw("  "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Mode  [1-9] select  [Left/Right] cycle ");

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

// ── Attachments ───────────────────────────────────────────────────────

fn render_attachments(frame: &mut Frame, area: Rect, snap: &RenderSnapshot) {
    let label_style = Style::default().fg(Color::DarkGray);
    let lines: Vec<Line> = snap
        .files
        .iter()
        .zip(["a", "b"])
        .enumerate()
        .map(|(i, (file, key))| {
            let label = Span::styled(format!("File {} [{key}]: ", i + 1), label_style);
            match file {
                Some((name, size)) => Line::from(vec![
                    label,
                    Span::styled(name.clone(), Style::default().fg(Color::White)),
                    Span::styled(format!("  ({})", format_size(*size)), label_style),
                ]),
                None => Line::from(vec![
                    label,
                    Span::styled("(none)", Style::default().fg(Color::DarkGray)),
                ]),
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Attachments  [x] clear ");

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ── Transcript Pane ───────────────────────────────────────────────────

fn render_transcript(frame: &mut Frame, area: Rect, snap: &RenderSnapshot, app: &App) {
    let user_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let bot_style = Style::default().fg(Color::White);
    let error_style = Style::default().fg(Color::Red);
    let pending_style = Style::default().fg(Color::Yellow);

    let mut lines: Vec<Line> = Vec::new();
    for entry in &snap.transcript {
        let (prefix, style) = match entry.speaker {
            Speaker::User => ("You: ", user_style),
            Speaker::Bot if entry.is_error() => ("Bot: ", error_style),
            Speaker::Bot => ("Bot: ", bot_style),
        };
        for (n, line) in entry.text.lines().enumerate() {
            let lead = if n == 0 { prefix } else { "     " };
            lines.push(Line::from(vec![
                Span::styled(lead, style.add_modifier(Modifier::BOLD)),
                Span::styled(line.to_string(), style),
            ]));
        }
        lines.push(Line::from(""));
    }
    if snap.awaiting {
        lines.push(Line::from(Span::styled("Bot: ...", pending_style)));
    }

    let scroll = tail_scroll(&lines, area, app.transcript_scroll);

    let border_color = if app.active_pane == ActivePane::Transcript {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let title = if snap.endpoint.is_empty() {
        " Chat ".to_string()
    } else {
        format!(" Chat  {} ", snap.endpoint)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll, 0))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ── Log Pane ──────────────────────────────────────────────────────────

fn render_logs(frame: &mut Frame, area: Rect, logs: &[LogLine], app: &App) {
    let lines: Vec<Line> = logs
        .iter()
        // Trace lines carry response bodies; too noisy here.
        .filter(|log| log.level != LogLevel::Trace)
        .map(|log| {
            Line::from(vec![
                Span::styled(format!("{} ", log.time), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{} ", log.level.label()), log_level_style(log.level)),
                Span::raw(log.message.as_str()),
            ])
        })
        .collect();

    let scroll = tail_scroll(&lines, area, app.log_scroll);

    let border_color = if app.active_pane == ActivePane::Log {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Log ");

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll, 0))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ── Input Bar ─────────────────────────────────────────────────────────

fn render_input(frame: &mut Frame, area: Rect, snap: &RenderSnapshot, app: &App) {
    let (title, style) = match app.input_mode {
        InputMode::Normal => {
            if let Some(ref msg) = app.status_message {
                (format!(" {msg} "), Style::default().fg(Color::Yellow))
            } else if let Some(ref status) = snap.status {
                (format!(" {status} "), Style::default().fg(Color::Red))
            } else if snap.awaiting {
                (" Waiting for the answer... ".to_string(), Style::default().fg(Color::Yellow))
            } else {
                (
                    " [i] ask  [a/b] attach  [e] end conversation  [,] logs  [q] quit ".to_string(),
                    Style::default().fg(Color::DarkGray),
                )
            }
        }
        InputMode::Question => {
            let char_count = snap.input.chars().count();
            let hint = if snap.awaiting {
                " Waiting for the answer... ".to_string()
            } else {
                format!(" Ask a question ({char_count} chars)  [Enter] send  [Esc] back ")
            };
            (hint, Style::default().fg(Color::Green))
        }
        InputMode::AttachPath(slot) => (
            format!(" Path for {slot}  [Enter] attach  [Esc] cancel "),
            Style::default().fg(Color::Magenta),
        ),
    };

    let input_text = match app.input_mode {
        InputMode::Normal if snap.input.is_empty() => String::new(),
        InputMode::Normal => format!("> {}", snap.input),
        InputMode::Question => format!("> {}\u{2588}", snap.input),
        InputMode::AttachPath(_) => format!("path: {}\u{2588}", app.path_buffer),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title);

    frame.render_widget(Paragraph::new(input_text).block(block), area);
}

// ── Tests ─────────────────────────────────────────────────────────────
