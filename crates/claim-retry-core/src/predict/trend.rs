use std::fmt;

use serde::{Deserialize, Serialize};

use super::heuristics::RiskHeuristics;
use crate::claim::RetryAttempt;

/// Whether recent failures are less or more severe than earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Degrading,
    InsufficientData,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Degrading => "degrading",
            Trend::InsufficientData => "insufficient_data",
        };
        f.write_str(s)
    }
}

/// Compare mean severity of the recent window against everything before it.
///
/// The recent window is the last `trend_window` attempts, shrunk so that at
/// least one earlier attempt remains to compare against.
pub fn compute_trend(history: &[RetryAttempt], heuristics: &RiskHeuristics) -> Trend {
    if history.len() < 2 {
        return Trend::InsufficientData;
    }
    let window = heuristics.trend_window.max(1).min(history.len() - 1);
    let (earlier, recent) = history.split_at(history.len() - window);

    let mean = |xs: &[RetryAttempt]| {
        xs.iter()
            .map(|a| heuristics.severity.get(a.category) as f64)
            .sum::<f64>()
            / xs.len() as f64
    };
    let delta = mean(recent) - mean(earlier);

    if delta < -heuristics.trend_dead_band {
        Trend::Improving
    } else if delta > heuristics.trend_dead_band {
        Trend::Degrading
    } else {
        Trend::Stable
    }
}
