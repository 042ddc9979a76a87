//! CLI for the badge-claim retry engine.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use claim_retry_core::config;

use commands::{run_classify, run_delay, run_history, run_report, run_simulate, SimulateArgs};

/// Top-level CLI for the claim retry engine.
#[derive(Debug, Parser)]
#[command(name = "claim-retry")]
#[command(about = "Classify badge-claim failures and plan retries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Classify a raw failure message.
    Classify {
        /// Error text from the failed mint/verify call.
        message: String,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the retry decision and backoff for a category after N failed attempts.
    Delay {
        /// Category name, e.g. gas_error.
        category: String,
        /// Failed attempts so far.
        attempt: u32,
    },

    /// Replay a sequence of failure messages for one claim and show each analysis.
    Simulate(SimulateArgs),

    /// Show audited attempts for a claim.
    History {
        /// Claim identifier.
        claim_id: String,
    },

    /// Summarise the audit log: attempts per category and claim outcomes.
    Report,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Classify { message, json } => run_classify(&message, json)?,
            CliCommand::Delay { category, attempt } => run_delay(&cfg, &category, attempt)?,
            CliCommand::Simulate(args) => run_simulate(&cfg, &args).await?,
            CliCommand::History { claim_id } => run_history(&claim_id).await?,
            CliCommand::Report => run_report().await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
