//! Experiment scenarios driven against fresh engine instances

use crate::stats::{Operation, PerformanceStats};
use dtss_core::{Engine, EngineConfig, ShareKind};
use num_bigint::BigUint;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

/// Operation sequence run after initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Decrease by three (when the result is at least two), then refresh working shares
    Basic,
    /// Increase by `extension`
    Expansion { extension: usize },
    /// Increase by `extension`, refresh working, decrease back, refresh master
    Mixed { extension: usize },
}

/// Fixed inputs shared by every experiment
#[derive(Debug, Clone)]
pub struct Params {
    pub participants: usize,
    pub modulus: BigUint,
    pub secret: BigUint,
}

/// Outcome of all experiments for one initial threshold
#[derive(Debug, Default)]
pub struct ThresholdRun {
    pub stats: PerformanceStats,
    pub successes: usize,
    pub failures: usize,
}

/// Run `experiments` independent engines for `threshold`
pub fn run_threshold(
    params: &Params,
    threshold: usize,
    scenario: Scenario,
    experiments: usize,
) -> ThresholdRun {
    let mut run = ThresholdRun::default();

    for experiment in 0..experiments {
        match run_experiment(params, threshold, scenario, &mut run.stats) {
            Ok(true) => run.successes += 1,
            Ok(false) => {
                warn!(threshold, experiment, "Recovered value does not match secret");
                run.failures += 1;
            }
            Err(e) => {
                warn!(threshold, experiment, error = %e, "Experiment failed");
                run.failures += 1;
            }
        }
    }

    debug!(
        threshold,
        successes = run.successes,
        failures = run.failures,
        "Threshold run finished"
    );
    run
}

/// One engine lifetime; returns whether both recovery paths gave the secret
pub fn run_experiment(
    params: &Params,
    threshold: usize,
    scenario: Scenario,
    stats: &mut PerformanceStats,
) -> dtss_core::Result<bool> {
    let config = EngineConfig::new(params.participants, threshold, params.modulus.clone())?;
    let mut engine = Engine::with_os_rng(config)?;
    let n = engine.participants();

    timed(stats, Operation::Initialize, || engine.initialize(&params.secret))?;

    let started = Instant::now();
    match scenario {
        Scenario::Basic => {
            if threshold >= 5 {
                timed(stats, Operation::Decrease, || engine.decrease(threshold - 3))?;
            }
            timed(stats, Operation::RefreshWorking, || {
                engine.refresh_working("test_update", 1)
            })?;
        }
        Scenario::Expansion { extension } => {
            if threshold + extension <= n {
                timed(stats, Operation::Increase, || {
                    engine.increase(threshold + extension)
                })?;
            }
        }
        Scenario::Mixed { extension } => {
            if extension > 0 && threshold + extension <= n {
                timed(stats, Operation::Increase, || {
                    engine.increase(threshold + extension)
                })?;
                timed(stats, Operation::RefreshWorking, || {
                    engine.refresh_working("mixed_scenario", 1)
                })?;
                timed(stats, Operation::Decrease, || engine.decrease(threshold))?;
                timed(stats, Operation::RefreshMain, || {
                    engine.refresh_main("mixed_scenario", 1)
                })?;
            }
        }
    }
    stats.record(Operation::Scenario, started.elapsed());

    let working: Vec<usize> = (0..engine.working_threshold()).collect();
    let master: Vec<usize> = (0..engine.main_threshold()).collect();

    let from_working = timed(stats, Operation::RecoverWorking, || {
        engine.recover(&working, ShareKind::Working)
    })?;
    let from_master = timed(stats, Operation::RecoverMain, || {
        engine.recover(&master, ShareKind::Master)
    })?;

    let secret = engine.secret()?;
    Ok(&from_working == secret && &from_master == secret)
}

fn timed<T>(
    stats: &mut PerformanceStats,
    op: Operation,
    f: impl FnOnce() -> dtss_core::Result<T>,
) -> dtss_core::Result<T> {
    let started = Instant::now();
    let result = f()?;
    stats.record(op, started.elapsed());
    Ok(result)
}
