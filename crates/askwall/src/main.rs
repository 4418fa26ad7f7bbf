//! Ask the StackWalls assistant one question and print the answer.
//!
//! # Examples
//!
//! ```sh
//! # Mode 2 never sends attachments
//! askwall --mode 2 --question "What does StackWalls do?"
//!
//! # Attach a pitch deck to a project discussion
//! askwall --mode 1 --question "Is this deck investor ready?" --file1 deck.pdf
//!
//! # Reset the server-side conversation
//! askwall --end-conversation
//! ```

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use askwall::attachment::{Attachment, Slot};
use askwall::config::{ClientConfig, DEFAULT_BASE_URL};
use askwall::controller::{ChatController, SubmitOutcome};
use askwall::events::LoggingHandler;
use askwall::request::DEFAULT_IDENTITY;
use askwall::transport::HttpTransport;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Ask the StackWalls assistant one question and print the answer.
#[derive(Parser)]
#[command(name = "askwall")]
struct Cli {
    // ── Server ─────────────────────────────────────────────────
    /// Scheme, host and port of the assistant server
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Value sent in the `username` field
    #[arg(long, default_value = DEFAULT_IDENTITY)]
    identity: String,

    /// Request timeout in seconds (0 waits forever)
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    // ── Question ───────────────────────────────────────────────
    /// Mode id (1-4)
    #[arg(long, default_value = "1")]
    mode: String,

    /// Question to ask
    #[arg(long, required_unless_present = "end_conversation")]
    question: Option<String>,

    /// First attachment
    #[arg(long)]
    file1: Option<PathBuf>,

    /// Second attachment
    #[arg(long)]
    file2: Option<PathBuf>,

    /// Reset the server-side conversation instead of asking
    #[arg(long)]
    end_conversation: bool,

    // ── Output ─────────────────────────────────────────────────
    /// Log requests and responses to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let timeout = (self.timeout > 0).then(|| Duration::from_secs(self.timeout));
        ClientConfig::default()
            .with_base_url(&self.base_url)
            .with_identity(&self.identity)
            .with_timeout(timeout)
    }
}

async fn run(cli: &Cli) -> Result<String, String> {
    let config = cli.client_config();
    let transport = HttpTransport::new(&config).map_err(|e| e.to_string())?;
    let controller = ChatController::new(transport)
        .with_identity(config.identity.clone())
        .with_event_handler(LoggingHandler);

    if cli.end_conversation {
        return controller
            .end_conversation()
            .await
            .map(|entry| entry.text)
            .ok_or_else(|| "a question is still in flight".to_string());
    }

    controller.select_mode(&cli.mode).map_err(|e| e.to_string())?;
    for (slot, path) in [(Slot::First, &cli.file1), (Slot::Second, &cli.file2)] {
        if let Some(path) = path {
            let attachment = Attachment::from_path(path)
                .await
                .map_err(|e| e.to_string())?;
            controller.set_file(slot, Some(attachment));
        }
    }

    let question = cli.question.as_deref().unwrap_or_default();
    match controller.submit(question).await {
        SubmitOutcome::Answered(entry) => Ok(entry.text),
        SubmitOutcome::Dropped => Err("question is empty".into()),
        SubmitOutcome::Busy => Err("a question is still in flight".into()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "askwall=debug" } else { "askwall=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
