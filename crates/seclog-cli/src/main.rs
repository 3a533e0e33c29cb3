use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seclog_core::AuditLogConfig;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "seclog", version, about = "Content security audit trail")]
struct Cli {
    /// Configuration file (YAML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info,seclog_audit=debug". Overrides the configured filter.
    #[arg(long = "log", env = "SECLOG_LOG", global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the activity type registered for content security changes.
    Describe,

    /// Replay recorded change events (JSON lines) through the audit pipeline.
    Replay {
        /// File with one change event, or `null`, per line.
        events: PathBuf,

        /// Principal the changes are attributed to.
        #[arg(long = "as", default_value = "admin")]
        actor: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AuditLogConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AuditLogConfig::default(),
    };

    let filter = cli
        .log_filter
        .clone()
        .unwrap_or_else(|| config.logging.filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).context("invalid log filter")?)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Describe => commands::describe::run()?,
        Command::Replay { events, actor } => commands::replay::run(&config, &events, &actor)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay_defaults() {
        let cli = Cli::try_parse_from(["seclog", "replay", "events.jsonl"]).unwrap();
        match cli.cmd {
            Command::Replay { events, actor } => {
                assert_eq!(events, PathBuf::from("events.jsonl"));
                assert_eq!(actor, "admin");
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "seclog",
            "replay",
            "events.jsonl",
            "--as",
            "alice",
            "--config",
            "seclog.yaml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("seclog.yaml")));
        assert!(matches!(cli.cmd, Command::Replay { ref actor, .. } if actor == "alice"));
    }

    #[test]
    fn test_replay_requires_events_file() {
        assert!(Cli::try_parse_from(["seclog", "replay"]).is_err());
    }
}
