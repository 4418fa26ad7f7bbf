//! Interactive terminal chat with the StackWalls assistant.
//!
//! # Examples
//!
//! ```sh
//! # Local development server
//! askwall-chat
//!
//! # Remote server, opening in mode 3 with the logs pane shown
//! askwall-chat --base-url https://assist.example.com --mode 3 --logs
//! ```

use std::sync::Arc;

use askwall::controller::ChatController;
use askwall::events::LoggingHandler;
use askwall::transport::HttpTransport;
use askwall::ui::request_quit;
use askwall::ui::tracing::UiTracingLayer;
use askwall_chat::{ChatAppConfig, Flow, dispatch};
use askwall_tui::{TuiConfig, command_channel, spawn_tui};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Interactive terminal chat with the StackWalls assistant.
#[derive(Parser)]
#[command(name = "askwall-chat")]
struct Cli {
    /// Scheme, host and port of the assistant server.
    #[arg(long, default_value = askwall::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Value sent in the `username` field.
    #[arg(long, default_value = askwall::request::DEFAULT_IDENTITY)]
    identity: String,

    /// Request timeout in seconds (0 waits forever).
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Mode active at startup.
    #[arg(long, default_value = askwall::mode::DEFAULT_MODE_ID)]
    mode: String,

    /// Open with the logs pane visible.
    #[arg(long)]
    logs: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = ChatAppConfig {
        base_url: cli.base_url,
        identity: cli.identity,
        timeout_secs: cli.timeout,
        initial_mode: cli.mode,
        show_logs: cli.logs,
    };

    let client_config = config.client_config();
    let transport = match HttpTransport::new(&client_config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let state = match config.build_state() {
        Ok(s) => s.into_shared(),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Set up tracing → TUI log buffer.
    let (tracing_layer, log_buffer) = UiTracingLayer::new();
    tracing_subscriber::registry().with(tracing_layer).init();

    let controller = Arc::new(
        ChatController::with_state(transport, state.clone())
            .with_identity(client_config.identity.clone())
            .with_event_handler(LoggingHandler),
    );
    info!("Talking to {}", client_config.chat_url());

    // Spawn TUI on a dedicated thread.
    let (tx, mut rx) = command_channel();
    let tui_config = TuiConfig::new(tx)
        .with_log_buffer(log_buffer)
        .with_show_logs(config.show_logs);
    let tui_handle = spawn_tui(state.clone(), tui_config);

    // The channel closes when the TUI thread exits.
    while let Some(cmd) = rx.recv().await {
        if let Flow::Quit = dispatch(&controller, cmd) {
            break;
        }
    }

    request_quit(&state);
    tui_handle.join().ok();
}
