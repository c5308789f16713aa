//! Tracing setup for the trainer CLI.
//!
//! One console layer (compact or JSON), plus an optional daily-rotated file
//! layer via `tracing-appender`. `RUST_LOG` still wins for per-module
//! directives; the `-v`/`-q` flags and the `[logging]` config section set the
//! baseline.

use std::fs;
use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingSettings;
use crate::error::{Error, Result};

/// Crates whose chatter drowns out the trainer's own logs.
const NOISY_DEPENDENCIES: &[&str] = &["hyper", "reqwest", "tokio_tungstenite", "tungstenite"];

/// Keeps the non-blocking file writer alive; dropping it flushes pending
/// log lines, so hold it until the process exits.
pub struct LogGuards {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber for a full trainer run.
pub fn init_logging(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Result<LogGuards> {
    let level = effective_level(settings, verbose, quiet);

    let mut file_output = None;
    let mut file_guard = None;
    if let Some(ref path) = settings.file {
        let (layer, guard) = file_layer(path, settings.max_files, settings.json_format)?;
        file_output = Some(layer);
        file_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(trainer_filter(level))
        .with(console_layer(settings.json_format))
        .with(file_output)
        .init();

    tracing::info!(
        level = %level,
        file = ?settings.file,
        json = settings.json_format,
        "Logging initialized"
    );

    Ok(LogGuards {
        _file_guard: file_guard,
    })
}

/// Minimal console-only setup for the short-lived subcommands. Safe to call
/// more than once.
pub fn init_simple(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(fmt::layer().compact())
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;
    Ok(())
}

/// `-q` beats everything; `-v`/`-vv` beat the config file.
fn effective_level(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => parse_level(&settings.level),
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Baseline filter at `level`, overridable per module through `RUST_LOG`,
/// with the usual dependency noise turned down.
fn trainer_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    if let Ok(own) = format!("claimsim={}", level).parse() {
        filter = filter.add_directive(own);
    }
    for dep in NOISY_DEPENDENCIES {
        if let Ok(directive) = format!("{}=warn", dep).parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

fn console_layer<S>(json: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    if json {
        Box::new(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE),
        )
    } else {
        Box::new(fmt::layer().with_target(true).with_ansi(true).compact())
    }
}

/// Daily-rotated file output under the configured path's directory, keeping
/// `max_files` rotations.
fn file_layer<S>(
    log_file: &str,
    max_files: u32,
    json: bool,
) -> Result<(Box<dyn Layer<S> + Send + Sync>, WorkerGuard)>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let path = Path::new(log_file);
    let directory = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(directory).map_err(|e| {
        Error::Config(format!(
            "Failed to create log directory '{}': {}",
            directory.display(),
            e
        ))
    })?;

    let prefix = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("claimsim.log");
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(max_files as usize)
        .build(directory)
        .map_err(|e| Error::Config(format!("Failed to create log file appender: {}", e)))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer: Box<dyn Layer<S> + Send + Sync> = if json {
        Box::new(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(false),
        )
    } else {
        Box::new(
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false),
        )
    };

    Ok((layer, guard))
}
