//! Extraction from trace files shaped like the driver's saved team state.

use opsearch::domain::models::{OptimizationMetric, TraceTagsConfig};
use opsearch::services::ResultExtractor;
use opsearch::{ErrorKind, PipelineError};
use std::path::PathBuf;
use tempfile::TempDir;

const TRACE: &str = r#"{
  "type": "TeamState",
  "version": "1.0.0",
  "messages": [
    {"type": "TextMessage", "source": "user", "content": "Find cheaper operating conditions.", "models_usage": null},
    {"type": "ToolCallSummaryMessage", "source": "ValidatorAgent",
     "content": "{\"conditions\": {\"h101_temperature\": 600.0, \"f101_pressure\": 3000.0}, \"valid\": true}"},
    {"type": "ToolCallSummaryMessage", "source": "MetricCalculationAgent", "content": "  1532.75 \n"},
    {"type": "TextMessage", "source": "OptimizerAgent", "content": "Trying a lower temperature."},
    {"type": "ToolCallSummaryMessage", "source": "ValidatorAgent",
     "content": {"schema_version": 1, "conditions": {"h101_temperature": 585.5, "f101_pressure": 2950.0}}},
    {"type": "ToolCallSummaryMessage", "source": "MetricCalculationAgent", "content": 1490.0},
    {"type": "ToolCallSummaryMessage", "source": "ValidatorAgent",
     "content": "{\"conditions\": {\"h101_temperature\": \"too hot\"}}"},
    {"type": "ToolCallSummaryMessage", "source": "MetricCalculationAgent", "content": "1400.0"},
    {"type": "ToolCallSummaryMessage", "source": "MetricCalculationAgent", "content": "Error: flash drum did not converge"}
  ]
}"#;

fn write_trace(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("optimization.json");
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_cost_trace_selects_minimum_with_paired_conditions() {
    let tmp = TempDir::new().unwrap();
    let path = write_trace(&tmp, TRACE);
    let tags = TraceTagsConfig::default();

    let outcome = ResultExtractor::new(OptimizationMetric::Cost, &tags)
        .extract_from_file(&path)
        .await
        .unwrap();

    assert_eq!(outcome.stats.metric_messages, 4);
    assert_eq!(outcome.stats.non_numeric, 1);
    assert_eq!(outcome.stats.unparseable_payloads, 1);
    assert_eq!(outcome.stats.unpaired, 1);
    assert_eq!(outcome.stats.candidates, 2);

    // 1400.0 follows the unparseable payload, so it has no conditions and is dropped.
    let best = outcome.into_best().unwrap();
    assert_eq!(best.metric_value, 1490.0);
    assert_eq!(best.conditions["h101_temperature"], 585.5);
    assert_eq!(best.conditions["f101_pressure"], 2950.0);
}

#[tokio::test]
async fn test_yield_trace_selects_maximum() {
    let tmp = TempDir::new().unwrap();
    let path = write_trace(&tmp, TRACE);
    let tags = TraceTagsConfig::default();

    let best = ResultExtractor::new(OptimizationMetric::Yield, &tags)
        .extract_from_file(&path)
        .await
        .unwrap()
        .into_best()
        .unwrap();

    assert_eq!(best.metric_value, 1532.75);
    assert_eq!(best.conditions["h101_temperature"], 600.0);
}

#[tokio::test]
async fn test_trace_file_errors_are_classified() {
    let tmp = TempDir::new().unwrap();
    let tags = TraceTagsConfig::default();
    let extractor = ResultExtractor::new(OptimizationMetric::Cost, &tags);

    let err = extractor
        .extract_from_file(&tmp.path().join("never_written.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::TraceUnreadable { .. }));
    assert_eq!(err.kind(), ErrorKind::Trace);

    let path = write_trace(&tmp, "{\"messages\": [");
    let err = extractor.extract_from_file(&path).await.unwrap_err();
    assert!(matches!(err, PipelineError::TraceMalformed { .. }));
}

#[tokio::test]
async fn test_empty_trace_has_no_candidate() {
    let tmp = TempDir::new().unwrap();
    let path = write_trace(&tmp, r#"{"messages": []}"#);
    let tags = TraceTagsConfig::default();

    let err = ResultExtractor::new(OptimizationMetric::YieldPerCost, &tags)
        .extract_from_file(&path)
        .await
        .unwrap()
        .into_best()
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoValidCandidate { metric_messages: 0 }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_reading_after_unparseable_payload_is_discarded() {
    let tmp = TempDir::new().unwrap();
    let path = write_trace(
        &tmp,
        r#"{"messages": [
          {"type": "ToolCallSummaryMessage", "source": "ValidatorAgent", "content": "{\"conditions\": {\"a\": 1.0}}"},
          {"type": "ToolCallSummaryMessage", "source": "MetricCalculationAgent", "content": "50"},
          {"type": "ToolCallSummaryMessage", "source": "ValidatorAgent", "content": "{\"conditions\": {\"a\": \"bad\"}}"},
          {"type": "ToolCallSummaryMessage", "source": "MetricCalculationAgent", "content": "3"}
        ]}"#,
    );
    let tags = TraceTagsConfig::default();

    let outcome = ResultExtractor::new(OptimizationMetric::Cost, &tags)
        .extract_from_file(&path)
        .await
        .unwrap();

    assert_eq!(outcome.stats.unpaired, 1);
    let best = outcome.into_best().unwrap();
    assert_eq!(best.metric_value, 50.0);
    assert_eq!(best.conditions["a"], 1.0);
}

#[tokio::test]
async fn test_reading_uses_only_its_nearest_preceding_validator() {
    let tmp = TempDir::new().unwrap();
    let path = write_trace(
        &tmp,
        r#"{"messages": [
          {"type": "ToolCallSummaryMessage", "source": "ValidatorAgent", "content": {"conditions": {"a": 1.0, "b": 10.0}}},
          {"type": "ToolCallSummaryMessage", "source": "ValidatorAgent", "content": {"conditions": {"a": 2.0}}},
          {"type": "TextMessage", "source": "OptimizerAgent", "content": "evaluating"},
          {"type": "ToolCallSummaryMessage", "source": "MetricCalculationAgent", "content": "7"},
          {"type": "ToolCallSummaryMessage", "source": "ValidatorAgent", "content": {"conditions": {"a": 3.0}}}
        ]}"#,
    );
    let tags = TraceTagsConfig::default();

    let best = ResultExtractor::new(OptimizationMetric::Cost, &tags)
        .extract_from_file(&path)
        .await
        .unwrap()
        .into_best()
        .unwrap();

    assert_eq!(best.metric_value, 7.0);
    assert_eq!(best.conditions.len(), 1);
    assert_eq!(best.conditions["a"], 2.0);
}
