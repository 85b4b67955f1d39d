//! Shared helpers for integration tests

#![allow(dead_code)]

use opsearch::domain::models::Config;
use opsearch::ConfigLoader;
use std::path::Path;

pub const PROMPT: &str = "Describe the HDA process and its operating constraints as JSON.";

/// Context agent reply with the given temperature range.
pub fn agent_reply(low: f64, high: f64) -> String {
    serde_json::json!({
        "process_overview": "Toluene hydrodealkylation to benzene.",
        "constraints": [
            {"variable": "H101 temperature", "range": [low, high], "unit": "K"},
            {"variable": "F102 deltaP", "range": [-200.0, 0.0], "unit": "kPa"}
        ]
    })
    .to_string()
}

/// OpenAI-style chat completion body wrapping `content`.
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 34}
    })
}

/// Configuration rooted at `dir`, talking to `base_url`, with a prompts file on disk.
pub fn test_config(dir: &Path, base_url: &str, iterations: u32, metric: &str) -> Config {
    let prompt_path = dir.join("prompts.yaml");
    std::fs::write(&prompt_path, format!("context_agent_prompt: \"{PROMPT}\"\n")).unwrap();

    let results = dir.join("Results");
    let yaml = format!(
        r#"
context_agent:
  context_sampling_iterations: {iterations}
  context_agent_prompt_path: "{prompt}"
  llm_process_overview_save_path: "{results}/process_overview.txt"
  llm_constraint_save_path: "{results}/generated_constraints.txt"
  llm_constraint_avg_save_path: "{results}/generated_constraints_avg.txt"
optimization:
  optimization_metric: "{metric}"
  optimization_save_path: "{results}/optimization.json"
model:
  api_key: sk-test-key
  model: gpt-4o
  base_url: "{base_url}"
  max_retries: 1
  initial_backoff_ms: 1
  max_backoff_ms: 5
  timeout_secs: 5
  model_info:
    vision: false
    function_calling: true
    json_output: true
    family: gpt-4o
"#,
        prompt = prompt_path.display(),
        results = results.display(),
    );
    ConfigLoader::load_from_str(&yaml).unwrap()
}
