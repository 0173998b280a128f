//! CLI for the utrack upload job tracker.

pub(crate) mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use utrack_core::config;

use commands::{run_config, run_status, run_watch, WatchOptions};

/// Top-level CLI for utrack.
#[derive(Debug, Parser)]
#[command(name = "utrack")]
#[command(about = "utrack: follow asynchronous upload jobs to completion", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Track a submitted job until it completes, fails or times out. Ctrl-C cancels.
    Watch {
        /// Job identifier returned by the upload endpoint.
        job_id: String,
        /// Notification server address (host:port); overrides notification_address from config.
        #[arg(long, value_name = "ADDR")]
        channel: Option<String>,
        /// Poll interval in milliseconds; overrides poll.interval_ms.
        #[arg(long, value_name = "N")]
        interval_ms: Option<u64>,
        /// Non-terminal poll responses before giving up; overrides poll.max_attempts.
        #[arg(long, value_name = "N")]
        max_attempts: Option<u32>,
        /// Poll only; do not open the push channel.
        #[arg(long, conflicts_with = "channel")]
        no_push: bool,
    },

    /// Query the status endpoint once and print the normalized status.
    Status {
        /// Job identifier.
        job_id: String,
    },

    /// Show the config file path and effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Watch {
                job_id,
                channel,
                interval_ms,
                max_attempts,
                no_push,
            } => {
                let opts = WatchOptions {
                    channel,
                    interval_ms,
                    max_attempts,
                    no_push,
                };
                run_watch(&cfg, &job_id, &opts).await?;
            }
            CliCommand::Status { job_id } => run_status(&cfg, &job_id).await?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
