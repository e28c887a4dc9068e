//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `stream_resolver` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Interactive iframe choice on a terminal
//! - User-facing output formatting and exit codes
//!
//! All core functionality is implemented in the library crate.

use std::io::{IsTerminal, Write};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use futures::StreamExt;

use stream_resolver::initialization::init_logger_with;
use stream_resolver::{IframeChooser, Opt, ResolveError, Resolver};

const EXIT_FATAL: i32 = 1;
const EXIT_NO_STREAMS: i32 = 2;

/// Asks on stderr and reads the answer from stdin.
struct StdinChooser;

#[async_trait]
impl IframeChooser for StdinChooser {
    async fn choose(&self, _candidates: &[String]) -> Option<String> {
        tokio::task::spawn_blocking(|| {
            eprint!("Choose an iframe number from above: ");
            let _ = std::io::stderr().flush();
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).ok()?;
            Some(line)
        })
        .await
        .ok()
        .flatten()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let json = opt.json;
    let (url, config) = opt.into_config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let mut builder = Resolver::builder(config);
    if std::io::stdin().is_terminal() {
        builder = builder.chooser(Arc::new(StdinChooser));
    }
    let resolver = builder.build().context("Failed to initialize resolver")?;

    let mut resolution = match resolver.resolve(&url).await {
        Ok(resolution) => resolution,
        Err(e @ (ResolveError::NoStreamsFound(_) | ResolveError::NoResolver(_))) => {
            eprintln!("stream_resolver: {e}");
            process::exit(EXIT_NO_STREAMS);
        }
        Err(e) => {
            eprintln!("stream_resolver error: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    let mut stdout = std::io::stdout();
    if !json {
        writeln!(stdout, "{}", resolution.title)?;
    }
    let mut found = 0usize;
    while let Some(stream) = resolution.streams.next().await {
        found += 1;
        if json {
            let line = serde_json::to_string(&stream).context("Failed to serialize stream")?;
            writeln!(stdout, "{line}")?;
        } else {
            writeln!(stdout, "{} {} {}", stream.label, stream.kind, stream.url)?;
        }
    }
    stdout.flush()?;

    if found == 0 {
        eprintln!("stream_resolver: no playable streams on {}", resolution.page_url);
        process::exit(EXIT_NO_STREAMS);
    }
    Ok(())
}
