//! DTSS Bench
//!
//! Command-line experiment driver for dynamic-threshold secret sharing:
//! - Runs a protocol scenario for several initial thresholds in parallel
//! - Times every operation on fresh engine instances
//! - Verifies working-share and master-share recovery

mod scenario;
mod stats;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use num_bigint::BigUint;
use rayon::prelude::*;
use scenario::{run_threshold, Params, Scenario, ThresholdRun};
use serde::Serialize;
use stats::{Operation, Summary};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn, Level};

/// 2^256 - 2^32 - 977
pub(crate) const DEFAULT_MODULUS: &str =
    "115792089237316195423570985008687907853269984665640564039457584007908834671663";

const DEFAULT_SECRET: &str =
    "73138218979700741375608676119062004991785096625092157987592068860966427730354";

/// DTSS Bench - dynamic-threshold secret sharing experiments
#[derive(Parser)]
#[command(name = "dtss-bench")]
#[command(about = "Time dynamic-threshold secret sharing protocols")]
#[command(version)]
struct Cli {
    /// Number of participants
    #[arg(short = 'n', long, env = "DTSS_PARTICIPANTS", default_value_t = 20)]
    participants: usize,

    /// Initial thresholds to test (comma-separated)
    #[arg(
        short,
        long,
        env = "DTSS_THRESHOLDS",
        value_delimiter = ',',
        default_values_t = [5, 7, 9, 11, 13]
    )]
    thresholds: Vec<usize>,

    /// Experiments per threshold
    #[arg(short, long, env = "DTSS_EXPERIMENTS", default_value_t = 1000)]
    experiments: usize,

    /// Prime modulus (decimal)
    #[arg(short, long, env = "DTSS_MODULUS", default_value = DEFAULT_MODULUS)]
    modulus: String,

    /// Secret to share (decimal)
    #[arg(short, long, env = "DTSS_SECRET", default_value = DEFAULT_SECRET)]
    secret: String,

    /// Worker threads (defaults to one per threshold)
    #[arg(short = 'j', long, env = "DTSS_THREADS")]
    threads: Option<usize>,

    /// Write a JSON report to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decrease by three, refresh working shares, recover
    Basic,

    /// Increase the threshold, recover
    Expansion {
        /// Threshold increment
        #[arg(short = 'k', long, default_value_t = 1)]
        extension: usize,
    },

    /// Increase, refresh working, decrease back, refresh master, recover
    Mixed {
        /// Threshold increment
        #[arg(short = 'k', long, default_value_t = 1)]
        extension: usize,
    },
}

impl Commands {
    fn scenario(&self) -> Scenario {
        match *self {
            Commands::Basic => Scenario::Basic,
            Commands::Expansion { extension } => Scenario::Expansion { extension },
            Commands::Mixed { extension } => Scenario::Mixed { extension },
        }
    }
}

/// Per-threshold results as written to the report
#[derive(Serialize)]
struct ThresholdReport {
    threshold: usize,
    successes: usize,
    failures: usize,
    operations: BTreeMap<Operation, Summary>,
}

#[derive(Serialize)]
struct Report {
    participants: usize,
    experiments: usize,
    scenario: Scenario,
    thresholds: Vec<ThresholdReport>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let params = Params {
        participants: cli.participants,
        modulus: parse_decimal(&cli.modulus).context("Invalid modulus")?,
        secret: parse_decimal(&cli.secret).context("Invalid secret")?,
    };
    let scenario = cli.command.scenario();

    let thresholds: Vec<usize> = cli
        .thresholds
        .iter()
        .copied()
        .filter(|&t| {
            let ok = t >= 1 && t <= cli.participants;
            if !ok {
                warn!(threshold = t, participants = cli.participants, "Skipping threshold");
            }
            ok
        })
        .collect();
    if thresholds.is_empty() {
        bail!("No threshold in 1..={} to test", cli.participants);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads.unwrap_or(thresholds.len()))
        .build()?;

    info!(
        participants = cli.participants,
        thresholds = ?thresholds,
        experiments = cli.experiments,
        scenario = ?scenario,
        "Starting experiments"
    );

    let started = Instant::now();
    let runs: Vec<(usize, ThresholdRun)> = pool.install(|| {
        thresholds
            .par_iter()
            .map(|&t| (t, run_threshold(&params, t, scenario, cli.experiments)))
            .collect()
    });

    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Experiments completed");

    let report = Report {
        participants: cli.participants,
        experiments: cli.experiments,
        scenario,
        thresholds: runs
            .into_iter()
            .map(|(threshold, run)| ThresholdReport {
                threshold,
                successes: run.successes,
                failures: run.failures,
                operations: run.stats.summarize(),
            })
            .collect(),
    };

    print_report(&report);

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = ?path, "Report saved");
    }

    Ok(())
}

fn parse_decimal(text: &str) -> Result<BigUint> {
    BigUint::parse_bytes(text.trim().as_bytes(), 10)
        .ok_or_else(|| anyhow::anyhow!("'{}' is not a decimal integer", text))
}

fn print_report(report: &Report) {
    println!("Performance ({} experiments per threshold):", report.experiments);
    for entry in &report.thresholds {
        println!();
        println!(
            "  t = {:<3} success {} / failure {}",
            entry.threshold, entry.successes, entry.failures
        );
        for (op, s) in &entry.operations {
            println!(
                "    {:<16} mean {:>9.3} ms  sd {:>9.3}  min {:>9.3}  max {:>9.3}",
                op.to_string(),
                s.mean_ms,
                s.std_dev_ms,
                s.min_ms,
                s.max_ms
            );
        }
    }
}
