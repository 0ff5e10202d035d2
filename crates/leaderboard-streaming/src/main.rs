// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod config;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{stdin, stdout, BufReader, BufWriter};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use leaderboard::errors::StreamError;
use leaderboard::streaming::{run_aggregator, run_local, run_projector, RunStats};

use crate::config::StreamingConfig;

#[derive(Parser)]
#[command(
    name = "leaderboard-streaming",
    version,
    about = "Per-player leaderboard statistics over line-oriented stdin/stdout"
)]
struct Cli {
    #[command(subcommand)]
    stage: Stage,
}

#[derive(Subcommand, Clone, Copy, Debug)]
enum Stage {
    /// Map stage: raw JSON events in, `username\tplayed,won,time_ms` lines out
    Project,
    /// Reduce stage: key-grouped partial lines in, `username,played,won,avg_seconds` lines out
    Aggregate,
    /// Project, sort by username and aggregate within this process
    Local,
}

#[tokio::main(flavor = "current_thread")]
pub async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = StreamingConfig::from_env();

    let subscriber = match EnvFilter::try_new(&config.log_level) {
        Ok(filter) => tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_level(true)
            .with_thread_names(false)
            .with_thread_ids(false)
            .with_line_number(false)
            .with_file(false)
            .with_target(true)
            .without_time()
            .finish(),
        Err(e) => {
            eprintln!("could not parse log level in configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    debug!("Logging subsystem enabled");

    match run(cli.stage, &config).await {
        Ok(stats) => {
            info!(
                stage = ?cli.stage,
                lines_read = stats.lines_read,
                records_emitted = stats.records_emitted,
                lines_skipped = stats.lines_skipped,
                "leaderboard stage complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("leaderboard stage {:?} failed: {e}", cli.stage);
            ExitCode::FAILURE
        }
    }
}

async fn run(stage: Stage, config: &StreamingConfig) -> Result<RunStats, StreamError> {
    let reader = BufReader::new(stdin());
    let writer = BufWriter::new(stdout());
    match stage {
        Stage::Project => run_projector(reader, writer).await,
        Stage::Aggregate => run_aggregator(reader, writer).await,
        Stage::Local => run_local(reader, writer, config.ranked).await,
    }
}
