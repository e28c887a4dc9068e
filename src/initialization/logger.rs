//! Logger initialization.
//!
//! Resolution progress (attempt numbers, rejected candidates, skipped
//! streams) is reported through `log`; this module installs the
//! `env_logger` backend that prints it.

use std::io::Write;

use colored::*;
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependencies whose own logging drowns out the resolver's.
const NOISY_MODULES: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("wiremock", LevelFilter::Warn),
];

fn level_marker(level: Level) -> (&'static str, ColoredString) {
    let name = level.to_string();
    match level {
        Level::Error => ("❌", name.red()),
        Level::Warn => ("⚠️", name.yellow()),
        Level::Info => ("✔️", name.green()),
        Level::Debug => ("🔍", name.blue()),
        Level::Trace => ("🔬", name.purple()),
    }
}

fn write_plain(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    let (emoji, level) = level_marker(record.level());
    writeln!(
        buf,
        "{} {} [{}] {}",
        emoji,
        record.target().cyan(),
        level,
        record.args()
    )
}

fn write_json(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    let line = serde_json::json!({
        "ts": chrono::Utc::now().timestamp_millis(),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    });
    writeln!(buf, "{line}")
}

/// Initializes the logger with the specified level and format.
///
/// Plain output is colored and prefixed with an emoji per level; JSON output
/// is one object per line with `ts`, `level`, `target` and `msg`.
///
/// `RUST_LOG` is read first, then `level` overrides it for this crate.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Override with CLI args (takes precedence)
/// RUST_LOG=debug stream_resolver https://example.com --log-level info
///
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=stream_resolver::filter=debug stream_resolver https://example.com
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, filter) in NOISY_MODULES {
        builder.filter_module(module, *filter);
    }
    builder.filter_module("stream_resolver", level);

    match format {
        LogFormat::Json => builder.format(write_json),
        LogFormat::Plain => builder.format(write_plain),
    };

    // try_init: tests may initialize more than once
    builder.try_init()?;
    Ok(())
}
