use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use tracing_subscriber::filter::{EnvFilter, LevelFilter, Targets};
use tracing_subscriber::prelude::*;

mod commands;
mod config;
mod storage;
mod tracing_layer;

use config::LecternConfig;
use tracing_layer::{RecoveryEvent, RecoveryEventLayer};

#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "Lectern - validate, repair, migrate and back up session files", long_about = None)]
struct Cli {
    /// Path to a config file (defaults to <config dir>/lectern/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a session file and report its defects
    Check {
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Repair a session file, writing a schema-current session
    Repair {
        file: PathBuf,
        /// Output path (defaults to rewriting the input in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// List every entry the recoverer dropped
        #[arg(short, long)]
        verbose: bool,
    },
    /// Upgrade a well-formed session file to the current schema
    Migrate {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a backup envelope for a session file
    Backup {
        file: PathBuf,
        /// Output path (defaults to the configured backup directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore a session from a backup envelope
    Restore {
        backup: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List backups in the configured backup directory
    Backups,
}

impl Commands {
    /// Whether dropped entries are listed after the run.
    fn captures_drops(&self) -> bool {
        matches!(self, Commands::Repair { verbose: true, .. })
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = LecternConfig::load(cli.config.as_deref())?;
    let recovery_events = init_tracing(
        &config.log_filter,
        cli.log_json,
        cli.command.captures_drops(),
    );

    let status = match cli.command {
        Commands::Check { file, json } => commands::check::run(&file, json)?,
        Commands::Repair { file, output, .. } => {
            commands::repair::run(&config, &file, output.as_deref())?;
            // Only `repair --verbose` installs the capture layer.
            if let Some(events) = &recovery_events {
                commands::repair::print_dropped(events);
            }
            ExitCode::SUCCESS
        }
        Commands::Migrate { file, output } => {
            commands::migrate::run(&config, &file, output.as_deref())?;
            ExitCode::SUCCESS
        }
        Commands::Backup { file, output } => {
            commands::backup::backup(&config, &file, output.as_deref())?;
            ExitCode::SUCCESS
        }
        Commands::Restore { backup, output } => {
            commands::backup::restore(&config, &backup, &output)?;
            ExitCode::SUCCESS
        }
        Commands::Backups => {
            commands::backup::list(&config)?;
            ExitCode::SUCCESS
        }
    };

    Ok(status)
}

/// Installs the log subscriber.
///
/// Console output honours `LECTERN_LOG`, falling back to the configured
/// filter. With `capture_drops`, recovery events from `lectern_core` are also
/// captured at debug level, independent of what is printed, and the
/// receiving end of that stream is returned.
fn init_tracing(
    default_filter: &str,
    json: bool,
    capture_drops: bool,
) -> Option<mpsc::Receiver<RecoveryEvent>> {
    let console_filter = EnvFilter::try_from_env("LECTERN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (recovery_layer, receiver) = if capture_drops {
        let (sender, receiver) = mpsc::channel();
        let layer = RecoveryEventLayer::new(sender).with_filter(
            Targets::new()
                .with_target("lectern_core", LevelFilter::DEBUG)
                .with_default(LevelFilter::OFF),
        );
        (Some(layer), Some(receiver))
    } else {
        (None, None)
    };

    let console_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(console_layer.with_filter(console_filter))
        .with(recovery_layer)
        .init();

    receiver
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_verbose_repair_captures_drops() {
        fn parse(args: &[&str]) -> Commands {
            Cli::try_parse_from(args).unwrap().command
        }

        assert!(parse(&["lectern", "repair", "s.json", "-v"]).captures_drops());
        assert!(!parse(&["lectern", "repair", "s.json"]).captures_drops());
        assert!(!parse(&["lectern", "check", "s.json"]).captures_drops());
        assert!(!parse(&["lectern", "backups"]).captures_drops());
    }
}
