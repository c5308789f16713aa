//! ClaimSim - Voice role-play training simulator
//!
//! This is the main entry point for the claimsim binary. The trainer connects
//! a trainee to a scripted AI customer persona over the realtime agent
//! runtime, records the conversation transcript, scores it with a
//! deterministic rule-based engine, and tracks per-persona progress.

mod cli;
mod config;
mod credential;
mod error;
mod guardrail;
mod logging;
mod persona;
mod progress;
mod scoring;
mod session;
mod transcript;
mod transport;
mod version;

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::{Cli, Commands, ConfigSubcommand, PersonasSubcommand, ProgressSubcommand};
use crate::config::TrainerConfig;
use crate::credential::{CredentialProvider, HttpCredentialProvider, StaticCredentialProvider};
use crate::error::{Error, Result};
use crate::persona::Registry;
use crate::progress::ProgressStore;
use crate::scoring::report;
use crate::session::{Orchestrator, SessionStatus};
use crate::transcript::{ItemKind, TranscriptLog};
use crate::transport::{RealtimeTransport, TransportEvent, WsTransport};

fn main() {
    let cli = Cli::parse();

    let result = dispatch(cli);
    if let Err(e) = result {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            version::print_version();
            Ok(())
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::Personas { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_personas_command(subcommand)
        }
        Commands::Progress { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_progress_command(subcommand)
        }
        Commands::Evaluate {
            transcript,
            persona,
            config,
            json,
            no_record,
        } => {
            logging::init_simple(if cli.verbose > 0 {
                tracing::Level::DEBUG
            } else {
                tracing::Level::WARN
            })?;
            handle_evaluate(config.as_deref(), &transcript, &persona, json, no_record)
        }
        Commands::Run {
            config,
            persona,
            muted,
            transcript_out,
            export_text,
            no_eval,
        } => {
            let trainer_config = TrainerConfig::load(config.as_deref())?;

            // The guards must be kept alive for the lifetime of the program
            let _log_guards =
                logging::init_logging(&trainer_config.logging, cli.verbose, cli.quiet)?;

            let build = version::build_info();
            info!(version = %build.full_version(), "Starting ClaimSim trainer");

            run_trainer(
                trainer_config,
                RunOptions {
                    persona,
                    muted,
                    transcript_out,
                    export_text,
                    no_eval,
                },
            )
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Run
// ─────────────────────────────────────────────────────────────────

/// Options for one `run` invocation.
struct RunOptions {
    persona: Option<String>,
    muted: bool,
    transcript_out: Option<String>,
    export_text: Option<String>,
    no_eval: bool,
}

fn run_trainer(config: TrainerConfig, options: RunOptions) -> Result<()> {
    // Single-threaded by design: the orchestrator is event-driven and no
    // operation blocks.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;

    rt.block_on(run_session(config, options))
}

async fn run_session(config: TrainerConfig, options: RunOptions) -> Result<()> {
    let registry = Arc::new(Registry::new()?);
    let kind = match options.persona {
        Some(ref slug) => registry.resolve(slug)?,
        None => registry.default_persona(),
    };

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let transport: Arc<dyn RealtimeTransport> = Arc::new(WsTransport::new(
        &config.transport.realtime_url,
        Duration::from_millis(config.transport.connect_timeout_ms),
        events_tx,
    ));
    let credentials = build_credential_provider(&config);

    let orchestrator = Orchestrator::new(
        registry,
        transport,
        credentials,
        config.session.clone(),
        config.prefs_path(),
    );

    if options.muted {
        orchestrator.set_playback(false).await;
    }

    orchestrator.select_persona(kind).await;
    orchestrator.connect().await;

    if orchestrator.status() != SessionStatus::Connected {
        return Err(Error::Transport(
            "could not establish a session; see the log for details".to_string(),
        ));
    }

    println!(
        "Connected. Speaking with the {} customer. Press Ctrl-C to end the conversation.",
        kind.display_name()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nEnding conversation.");
                break;
            }
            maybe_event = events.recv() => match maybe_event {
                Some(event) => {
                    print_event(&event);
                    orchestrator.handle_event(event);
                    if orchestrator.status() == SessionStatus::Disconnected {
                        break;
                    }
                }
                None => break,
            }
        }
    }

    orchestrator.disconnect().await;

    if let Some(path) = options.transcript_out {
        let json = orchestrator.transcript_json()?;
        fs::write(&path, json).map_err(|e| Error::IoWrite {
            path: PathBuf::from(&path),
            source: e,
        })?;
        println!("Transcript written to {}", path);
    }

    if let Some(path) = options.export_text {
        fs::write(&path, orchestrator.export_transcript_text()).map_err(|e| Error::IoWrite {
            path: PathBuf::from(&path),
            source: e,
        })?;
        println!("Transcript rendering written to {}", path);
    }

    if !options.no_eval && !orchestrator.transcript_is_empty() {
        // A handoff may have moved the conversation to another persona; the
        // evaluation belongs to whoever held it last.
        let scored_kind = orchestrator.active_persona().unwrap_or(kind);
        let result = orchestrator.evaluate();

        let mut store = ProgressStore::open(config.progress_path());
        let progress = store.record(scored_kind, result.overall);

        println!();
        println!(
            "{}",
            report::render(&result, scored_kind.display_name(), Some(&progress))
        );
        if store.all_passed() {
            println!("All customer types completed!");
        }
    }

    Ok(())
}

/// Credential source: an explicit secret from the environment wins, otherwise
/// the configured HTTP session endpoint is asked once per connect.
fn build_credential_provider(config: &TrainerConfig) -> Arc<dyn CredentialProvider> {
    match std::env::var("CLAIMSIM_CLIENT_SECRET") {
        Ok(secret) if !secret.is_empty() => Arc::new(StaticCredentialProvider::fixed(secret)),
        _ => Arc::new(HttpCredentialProvider::new(&config.transport.credential_url)),
    }
}

/// Echo transport activity to the terminal.
fn print_event(event: &TransportEvent) {
    match event {
        TransportEvent::ItemAppended(item) => {
            if !item.is_hidden() {
                if let ItemKind::Message { role, text, .. } = &item.kind {
                    if !text.is_empty() {
                        println!("{}: {}", role, text);
                    }
                }
            }
        }
        TransportEvent::ItemUpdated { text, .. } => {
            if !text.is_empty() {
                println!("  … {}", text);
            }
        }
        TransportEvent::AgentHandoff { persona } => {
            println!("-- call transferred to {}", persona);
        }
        TransportEvent::Disconnected { reason } => {
            println!("-- session ended: {}", reason);
        }
        TransportEvent::Connected
        | TransportEvent::GuardrailVerdict { .. }
        | TransportEvent::Error { .. } => {}
    }
}

// ─────────────────────────────────────────────────────────────────
// Evaluate
// ─────────────────────────────────────────────────────────────────

fn handle_evaluate(
    config_path: Option<&str>,
    transcript_path: &str,
    persona: &str,
    json: bool,
    no_record: bool,
) -> Result<()> {
    let config = TrainerConfig::load(config_path)?;
    let registry = Registry::new()?;
    let kind = registry.resolve(persona)?;

    let content = fs::read_to_string(transcript_path).map_err(|e| Error::IoRead {
        path: PathBuf::from(transcript_path),
        source: e,
    })?;
    let log = TranscriptLog::from_json_str(&content)?;

    let result = scoring::evaluate(log.items(), kind.display_name());

    let progress = if no_record {
        None
    } else {
        let mut store = ProgressStore::open(config.progress_path());
        Some(store.record(kind, result.overall))
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{}",
            report::render(&result, kind.display_name(), progress.as_ref())
        );
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Progress
// ─────────────────────────────────────────────────────────────────

fn handle_progress_command(subcommand: ProgressSubcommand) -> Result<()> {
    match subcommand {
        ProgressSubcommand::Show { config } => {
            let config = TrainerConfig::load(config.as_deref())?;
            let store = ProgressStore::open(config.progress_path());

            println!(
                "{:<20} {:<8} {:<6} {:<9} Last Attempt",
                "Persona", "Passed", "Best", "Attempts"
            );
            for (kind, progress) in store.snapshot() {
                let last = progress
                    .last_attempt
                    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<20} {:<8} {:<6} {:<9} {}",
                    kind.display_name(),
                    if progress.passed { "yes" } else { "no" },
                    progress.best_score,
                    progress.attempts,
                    last
                );
            }
            if store.all_passed() {
                println!("\nAll customer types completed!");
            }
            Ok(())
        }
        ProgressSubcommand::Reset { config, yes } => {
            let config = TrainerConfig::load(config.as_deref())?;

            if !yes && !confirm("Reset all training progress? [y/N] ")? {
                println!("Aborted.");
                return Ok(());
            }

            let mut store = ProgressStore::open(config.progress_path());
            store.reset();
            println!("Progress reset.");
            Ok(())
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

// ─────────────────────────────────────────────────────────────────
// Personas
// ─────────────────────────────────────────────────────────────────

fn handle_personas_command(subcommand: PersonasSubcommand) -> Result<()> {
    let registry = Registry::new()?;

    match subcommand {
        PersonasSubcommand::List => {
            let config = TrainerConfig::load(None)?;
            let store = ProgressStore::open(config.progress_path());

            println!("{:<18} {:<20} {:<9} Passed", "Slug", "Name", "Voice");
            for persona in registry.personas() {
                let passed = store.progress(persona.kind).passed;
                println!(
                    "{:<18} {:<20} {:<9} {}",
                    persona.slug(),
                    persona.display_name(),
                    persona.voice,
                    if passed { "yes" } else { "no" }
                );
            }
            Ok(())
        }
        PersonasSubcommand::Show { persona } => {
            let kind = registry.resolve(&persona)?;
            let persona = registry.get(kind);

            println!("{} ({})", persona.display_name(), persona.slug());
            println!("Voice: {}", persona.voice);
            println!("Handoff: {}", persona.handoff_description);
            let targets: Vec<&str> = persona.handoffs.iter().map(|k| k.slug()).collect();
            println!("Hands off to: {}", targets.join(", "));
            println!("\n{}", persona.instructions.trim());
            Ok(())
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────

fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let loaded = TrainerConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&loaded)?);
            Ok(())
        }
        ConfigSubcommand::Init { path, force } => config::init_config(path.as_deref(), force),
        ConfigSubcommand::Validate { config } => {
            let loaded = TrainerConfig::load(config.as_deref())?;
            loaded.validate()?;
            println!("Configuration is valid.");
            Ok(())
        }
    }
}
