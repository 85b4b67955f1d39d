//! Output formatting utilities for the CLI.

pub mod progress;

use serde::Serialize;

use crate::domain::models::{AggregatedConstraintSet, CandidateResult, OptimizationMetric};

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// `Avg constraint:` followed by the aggregated artifact lines.
pub fn format_constraints(constraints: &AggregatedConstraintSet) -> String {
    format!("Avg constraint:\n{constraints}")
}

/// Best metric value and its conditions, one indented line per condition.
pub fn format_best(metric: OptimizationMetric, best: &CandidateResult) -> String {
    let mut lines = vec![
        format!("Best {metric} value: {:?}", best.metric_value),
        "Best conditions:".to_string(),
    ];
    lines.extend(
        best.conditions
            .iter()
            .map(|(name, value)| format!("  {name}: {value:?}")),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_format_best() {
        let best = CandidateResult {
            metric_value: 12.0,
            conditions: BTreeMap::from([
                ("f102_deltap".to_string(), -150.0),
                ("h101_temperature".to_string(), 600.5),
            ]),
        };
        assert_eq!(
            format_best(OptimizationMetric::Cost, &best),
            "Best cost value: 12.0\nBest conditions:\n  f102_deltap: -150.0\n  h101_temperature: 600.5"
        );
    }
}
