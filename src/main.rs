//! spsc-pool - prime search over a fixed worker pool
//!
//! # Usage
//!
//! ```bash
//! # Threaded run, report written to output.txt
//! spsc-pool threaded --workers 4 --rounds 20 --delay-ms 1
//!
//! # Same item range on one thread, for comparison
//! spsc-pool reference --workers 4 --output output_single_t.txt
//!
//! # Report to stdout
//! spsc-pool threaded --output -
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use spsc_pool::{
    config::{DEFAULT_DELAY, DEFAULT_ROUNDS, DEFAULT_WORKERS},
    run_reference, Orchestrator, PoolConfig, PrimeWorkload, RunReport, DEFAULT_BATCH_SIZE,
};

/// Prime search over SPSC-connected worker threads
#[derive(Parser)]
#[command(name = "spsc-pool")]
#[command(about = "Fixed worker pool exchanging batches over lock-free SPSC queues")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the worker pool
    Threaded {
        #[command(flatten)]
        run: RunArgs,

        /// Report destination, `-` for stdout
        #[arg(short, long, default_value = "output.txt")]
        output: PathBuf,
    },

    /// Check the same items on the current thread
    Reference {
        #[command(flatten)]
        run: RunArgs,

        /// Report destination, `-` for stdout
        #[arg(short, long, default_value = "output_single_t.txt")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Number of worker threads
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Number of submission rounds
    #[arg(short, long, default_value_t = DEFAULT_ROUNDS)]
    rounds: usize,

    /// Simulated cost per item, in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_DELAY.as_millis() as u64)]
    delay_ms: u64,

    /// Sleep after pushing each round, in milliseconds
    #[arg(long, default_value_t = 1)]
    settle_ms: u64,
}

impl RunArgs {
    fn config(&self) -> PoolConfig {
        PoolConfig::builder()
            .workers(self.workers)
            .rounds(self.rounds)
            .delay(Duration::from_millis(self.delay_ms))
            .settle(Duration::from_millis(self.settle_ms))
            .build()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let (report, output) = match cli.command {
        Commands::Threaded { run, output } => {
            let config = run.config();
            let report = Orchestrator::<DEFAULT_BATCH_SIZE>::run(config)
                .context("threaded run failed")?;
            (report, output)
        }
        Commands::Reference { run, output } => {
            let config = run.config();
            let workload = PrimeWorkload::new(config.delay);
            let report = run_reference(&config, DEFAULT_BATCH_SIZE, &workload);
            (report, output)
        }
    };

    write_report(&report, &output)?;
    eprintln!("{}", report.summary());
    Ok(())
}

fn write_report(report: &RunReport, output: &Path) -> Result<()> {
    if output == Path::new("-") {
        let stdout = io::stdout();
        return report
            .write_to(stdout.lock())
            .context("failed to write report to stdout");
    }
    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    report
        .write_to(&mut writer)
        .with_context(|| format!("failed to write {}", output.display()))?;
    writer.flush()?;
    info!(path = %output.display(), "report written");
    Ok(())
}
