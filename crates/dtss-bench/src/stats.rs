//! Timing statistics collected across experiments

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Timed protocol operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Initialize,
    Increase,
    Decrease,
    RefreshWorking,
    RefreshMain,
    RecoverWorking,
    RecoverMain,
    Scenario,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Initialize => "initialize",
            Operation::Increase => "increase",
            Operation::Decrease => "decrease",
            Operation::RefreshWorking => "refresh working",
            Operation::RefreshMain => "refresh master",
            Operation::RecoverWorking => "recover working",
            Operation::RecoverMain => "recover master",
            Operation::Scenario => "whole scenario",
        };
        f.write_str(name)
    }
}

/// Raw samples per operation
#[derive(Debug, Clone, Default)]
pub struct PerformanceStats {
    samples: BTreeMap<Operation, Vec<Duration>>,
}

impl PerformanceStats {
    pub fn record(&mut self, op: Operation, elapsed: Duration) {
        self.samples.entry(op).or_default().push(elapsed);
    }

    pub fn merge(&mut self, other: PerformanceStats) {
        for (op, samples) in other.samples {
            self.samples.entry(op).or_default().extend(samples);
        }
    }

    pub fn summarize(&self) -> BTreeMap<Operation, Summary> {
        self.samples
            .iter()
            .filter_map(|(op, samples)| Summary::from_samples(samples).map(|s| (*op, s)))
            .collect()
    }
}

/// Aggregate timings in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean_ms: f64,
    pub std_dev_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl Summary {
    /// Population statistics; `None` when there are no samples
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let ms: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1e3).collect();
        let count = ms.len();
        let mean = ms.iter().sum::<f64>() / count as f64;
        let variance = ms.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            mean_ms: mean,
            std_dev_ms: variance.sqrt(),
            min_ms: ms.iter().copied().fold(f64::INFINITY, f64::min),
            max_ms: ms.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}
