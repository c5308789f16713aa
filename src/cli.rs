//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the ClaimSim trainer.

use clap::{Parser, Subcommand};

/// ClaimSim - Voice role-play training simulator
///
/// Connects a trainee to a scripted AI customer persona over the realtime
/// agent runtime, records the conversation transcript, scores it, and tracks
/// per-persona progress.
#[derive(Parser, Debug)]
#[command(name = "claimsim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the trainer
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a training session against a customer persona
    Run {
        /// Path to configuration file
        #[arg(short, long, env = "CLAIMSIM_CONFIG")]
        config: Option<String>,

        /// Customer persona to speak with (see 'personas list')
        #[arg(short, long, env = "CLAIMSIM_PERSONA")]
        persona: Option<String>,

        /// Start with persona audio playback muted
        #[arg(long)]
        muted: bool,

        /// Write the conversation transcript (JSON) to this path on exit
        #[arg(long)]
        transcript_out: Option<String>,

        /// Write a human-readable transcript rendering to this path on exit
        #[arg(long)]
        export_text: Option<String>,

        /// Skip the evaluation after the session ends
        #[arg(long)]
        no_eval: bool,
    },

    /// Score a recorded transcript and update progress
    Evaluate {
        /// Path to a transcript JSON file (as written by 'run --transcript-out')
        #[arg(short, long)]
        transcript: String,

        /// Persona the transcript was recorded against (see 'personas list')
        #[arg(short, long)]
        persona: String,

        /// Path to configuration file
        #[arg(short, long, env = "CLAIMSIM_CONFIG")]
        config: Option<String>,

        /// Print the evaluation as JSON instead of a report
        #[arg(long)]
        json: bool,

        /// Do not record the result in the progress store
        #[arg(long)]
        no_record: bool,
    },

    /// Show or reset per-persona training progress
    Progress {
        #[command(subcommand)]
        subcommand: ProgressSubcommand,
    },

    /// Customer persona catalog
    Personas {
        #[command(subcommand)]
        subcommand: PersonasSubcommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Progress subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProgressSubcommand {
    /// Show pass/fail, best score, and attempts for every persona
    Show {
        /// Path to configuration file
        #[arg(short, long, env = "CLAIMSIM_CONFIG")]
        config: Option<String>,
    },

    /// Reset all progress back to zero
    Reset {
        /// Path to configuration file
        #[arg(short, long, env = "CLAIMSIM_CONFIG")]
        config: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Personas subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonasSubcommand {
    /// List all customer personas
    List,

    /// Show a persona's voice, handoff targets, and behavioral prompt
    Show {
        /// Persona slug (e.g. auto-claim)
        persona: String,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Verifies that the CLI definition is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["claimsim", "run"]);
        match cli.command {
            Commands::Run {
                config,
                persona,
                muted,
                ..
            } => {
                assert!(config.is_none());
                assert!(persona.is_none());
                assert!(!muted);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_with_persona() {
        let cli = Cli::parse_from(["claimsim", "run", "--persona", "auto-claim", "--muted"]);
        match cli.command {
            Commands::Run { persona, muted, .. } => {
                assert_eq!(persona, Some("auto-claim".to_string()));
                assert!(muted);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_evaluate_command() {
        let cli = Cli::parse_from([
            "claimsim",
            "evaluate",
            "--transcript",
            "session.json",
            "--persona",
            "house-fire",
            "--json",
        ]);
        match cli.command {
            Commands::Evaluate {
                transcript,
                persona,
                json,
                no_record,
                ..
            } => {
                assert_eq!(transcript, "session.json");
                assert_eq!(persona, "house-fire");
                assert!(json);
                assert!(!no_record);
            }
            _ => panic!("Expected Evaluate command"),
        }
    }

    #[test]
    fn test_progress_show() {
        let cli = Cli::parse_from(["claimsim", "progress", "show"]);
        match cli.command {
            Commands::Progress {
                subcommand: ProgressSubcommand::Show { config },
            } => assert!(config.is_none()),
            _ => panic!("Expected Progress Show command"),
        }
    }

    #[test]
    fn test_progress_reset() {
        let cli = Cli::parse_from(["claimsim", "progress", "reset", "--yes"]);
        match cli.command {
            Commands::Progress {
                subcommand: ProgressSubcommand::Reset { yes, .. },
            } => assert!(yes),
            _ => panic!("Expected Progress Reset command"),
        }
    }

    #[test]
    fn test_personas_list() {
        let cli = Cli::parse_from(["claimsim", "personas", "list"]);
        match cli.command {
            Commands::Personas {
                subcommand: PersonasSubcommand::List,
            } => {}
            _ => panic!("Expected Personas List command"),
        }
    }

    #[test]
    fn test_personas_show() {
        let cli = Cli::parse_from(["claimsim", "personas", "show", "windshield"]);
        match cli.command {
            Commands::Personas {
                subcommand: PersonasSubcommand::Show { persona },
            } => assert_eq!(persona, "windshield"),
            _ => panic!("Expected Personas Show command"),
        }
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["claimsim", "config", "init", "--force"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_verbose_flags() {
        let cli = Cli::parse_from(["claimsim", "-vv", "version"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::parse_from(["claimsim", "--quiet", "version"]);
        assert!(cli.quiet);
    }
}
