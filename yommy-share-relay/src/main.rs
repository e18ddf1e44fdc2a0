//! Yommy Share Relay
//!
//! Command-line host for both sides of the share hand-off. The sharing
//! commands (`send`, `view`, `extension`) append to the shared namespace; the
//! consuming commands (`call`, `serve`) answer bridge method calls from it.
//!
//! `serve` speaks line-delimited JSON on stdin/stdout:
//!
//! ```text
//! > {"method":"getSharedURLs"}
//! < {"status":"success","result":["https://example.com"]}
//! ```
//!
//! Logs go to stderr so stdout only carries replies.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use yommy_share::channel::encode_reply;
use yommy_share::storage::{default_data_dir, load_settings};
use yommy_share::{
    intake_surface, share_channel, Attachment, ExtensionItem, MethodCall, RelayDiscipline,
    ShareChannel, ShareIntent, ShareSettings, SharedStorage,
};

/// Yommy share intake and relay host
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Root directory holding the shared namespaces
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Settings file (defaults to <data-dir>/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured relay discipline
    #[arg(long, global = true, value_parser = parse_discipline)]
    discipline: Option<RelayDiscipline>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deliver a "send text" notification
    Send {
        /// MIME type marker; text is only read for text/plain
        #[arg(long, default_value = "text/plain")]
        mime: String,
        text: String,
    },

    /// Deliver a "view/open" notification carrying a URL
    View { url: String },

    /// Run a share-extension request with a single attachment
    Extension {
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        url: Option<String>,
        #[arg(long)]
        text: Option<String>,
    },

    /// Answer one bridge method call and print the reply
    Call { method: String },

    /// Answer line-delimited JSON method calls from stdin
    Serve,
}

fn parse_discipline(value: &str) -> std::result::Result<RelayDiscipline, String> {
    match value {
        "batch" => Ok(RelayDiscipline::Batch),
        "drain-single" | "drainSingle" => Ok(RelayDiscipline::DrainSingle),
        other => Err(format!(
            "unknown discipline {:?} (expected batch or drain-single)",
            other
        )),
    }
}

fn resolve_settings(args: &Args, data_dir: &Path) -> Result<ShareSettings> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join("settings.json"));
    let mut settings = load_settings(&config_path)
        .with_context(|| format!("Failed to load settings from {:?}", config_path))?;
    if let Some(discipline) = args.discipline {
        settings.discipline = discipline;
    }
    Ok(settings)
}

/// Answers one reply per non-blank input line until EOF.
///
/// Lines that are not valid UTF-8 or not valid calls get an error reply;
/// only a failed read or write ends the loop early.
fn serve<S: SharedStorage>(
    channel: &ShareChannel<S>,
    mut input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .context("Failed to read from stdin")?;
        if read == 0 {
            break;
        }
        if buf.iter().all(|b| b.is_ascii_whitespace()) {
            continue;
        }
        writeln!(output, "{}", channel.handle_bytes(&buf))?;
        output.flush()?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yommy_share=info".parse()?)
                .add_directive("yommy_share_relay=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let data_dir = match args.data_dir.clone() {
        Some(dir) => dir,
        None => default_data_dir().context("No --data-dir given and no platform data dir")?,
    };
    let settings = resolve_settings(&args, &data_dir)?;
    debug!("Data dir: {:?}, namespace: {}", data_dir, settings.app_group_id);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Send { mime, text } => {
            let intake = intake_surface(&data_dir, &settings);
            let saved = intake.handle_intent(ShareIntent::Send {
                mime_type: Some(mime),
                text: Some(text),
            });
            writeln!(out, "{}", serde_json::to_string(&saved)?)?;
        }
        Command::View { url } => {
            let intake = intake_surface(&data_dir, &settings);
            let saved = intake.handle_intent(ShareIntent::View { data: Some(url) });
            writeln!(out, "{}", serde_json::to_string(&saved)?)?;
        }
        Command::Extension { url, text } => {
            let attachment = match (url, text) {
                (Some(url), _) => Attachment::Url(url),
                (None, Some(text)) => Attachment::PlainText(text),
                (None, None) => anyhow::bail!("extension needs --url or --text"),
            };
            let intake = intake_surface(&data_dir, &settings);
            let outcome = intake.handle_extension(&[ExtensionItem {
                attachments: vec![attachment],
            }]);
            if let Some(handoff) = &outcome.handoff {
                info!("Hand-off to main app via {}", handoff);
            }
            writeln!(out, "{}", serde_json::to_string(&outcome)?)?;
        }
        Command::Call { method } => {
            let channel = share_channel(&data_dir, &settings);
            let reply = channel.call(&MethodCall::new(method));
            writeln!(out, "{}", encode_reply(&reply))?;
        }
        Command::Serve => {
            let channel = share_channel(&data_dir, &settings);
            info!(
                "Serving channel {} ({:?}) on stdin/stdout",
                channel.name(),
                channel.relay().discipline()
            );
            let stdin = std::io::stdin();
            serve(&channel, stdin.lock(), &mut out)?;
            info!("stdin closed, shutting down");
        }
    }

    Ok(())
}
