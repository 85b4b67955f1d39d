//! Conversation trace written by the optimization driver.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Highest validator payload schema version understood by the parser.
pub const CONDITIONS_SCHEMA_VERSION: u32 = 1;

/// Chronological log of agent messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationTrace {
    pub messages: Vec<TraceMessage>,
}

/// One agent message in the trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceMessage {
    /// Message kind tag, e.g. `ToolCallSummaryMessage`
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Name of the emitting agent
    #[serde(default)]
    pub source: String,

    /// Text or structured payload
    #[serde(default)]
    pub content: Value,
}

impl TraceMessage {
    pub fn new(kind: impl Into<String>, source: impl Into<String>, content: Value) -> Self {
        Self {
            kind: kind.into(),
            source: source.into(),
            content,
        }
    }

    /// Whether the content mentions a `conditions` payload at all.
    pub fn mentions_conditions(&self) -> bool {
        match &self.content {
            Value::String(text) => text.contains("conditions"),
            Value::Object(map) => map.contains_key("conditions"),
            _ => false,
        }
    }

    /// Read the content as a metric reading.
    ///
    /// Numbers are taken as-is; strings are trimmed and parsed as `f64`.
    pub fn metric_value(&self) -> Option<f64> {
        match &self.content {
            Value::Number(n) => n.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Strictly parse the content as a validator conditions payload.
    pub fn conditions_payload(&self) -> Result<ConditionsPayload, PayloadError> {
        ConditionsPayload::parse(&self.content)
    }
}

/// Operating conditions proposed by the validator agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionsPayload {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    pub conditions: BTreeMap<String, f64>,
}

const fn default_schema_version() -> u32 {
    CONDITIONS_SCHEMA_VERSION
}

/// Why a validator payload could not be used.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Validator payload is not a JSON object")]
    NotAnObject,

    #[error("Unparseable validator payload: {0}")]
    Unparseable(#[from] serde_json::Error),

    #[error("Unsupported validator payload schema version: {0}")]
    UnsupportedVersion(u32),
}

impl ConditionsPayload {
    /// Parse structured content, or a string holding a JSON object.
    pub fn parse(content: &Value) -> Result<Self, PayloadError> {
        let payload: Self = match content {
            Value::Object(_) => serde_json::from_value(content.clone())?,
            Value::String(text) => {
                let value: Value = serde_json::from_str(text.trim())?;
                if !value.is_object() {
                    return Err(PayloadError::NotAnObject);
                }
                serde_json::from_value(value)?
            }
            _ => return Err(PayloadError::NotAnObject),
        };

        if payload.schema_version > CONDITIONS_SCHEMA_VERSION {
            return Err(PayloadError::UnsupportedVersion(payload.schema_version));
        }
        Ok(payload)
    }
}
