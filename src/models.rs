use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metric scored when a request does not name one
pub const DEFAULT_METRIC: &str = "answer_relevancy";

/// Metric selection as sent by clients: either one name or a list of names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricSelection {
    Single(String),
    Many(Vec<String>),
}

impl MetricSelection {
    /// Flatten the selection into an ordered list of metric names
    pub fn into_names(self) -> Vec<String> {
        match self {
            MetricSelection::Single(name) => vec![name],
            MetricSelection::Many(names) => names,
        }
    }
}

impl Default for MetricSelection {
    fn default() -> Self {
        MetricSelection::Single(DEFAULT_METRIC.to_string())
    }
}

/// Inbound evaluation request. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// The question that was asked
    pub query: Option<String>,
    /// The generated answer being scored
    pub output: Option<String>,
    /// Supporting passages the answer should be grounded in
    pub context: Option<Vec<String>>,
    /// Metric name or list of metric names
    pub metric: Option<MetricSelection>,
}

impl EvaluationRequest {
    /// Load a request from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON request: {}", path.display()))
    }
}

/// Request with defaults applied, as consumed by the scoring heuristics
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationInput {
    pub query: String,
    pub output: String,
    pub context: Vec<String>,
    /// Metric names in the order they were requested
    pub metrics: Vec<String>,
}

impl From<EvaluationRequest> for EvaluationInput {
    fn from(request: EvaluationRequest) -> Self {
        Self {
            query: request.query.unwrap_or_default(),
            output: request.output.unwrap_or_default(),
            context: request.context.unwrap_or_default(),
            metrics: request.metric.unwrap_or_default().into_names(),
        }
    }
}

/// Result for a single metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreResult {
    /// Higher is better, 0.0 to 1.0
    Score { score: f64, explanation: String },
    /// Lower is better, 0.0 to 1.0 (hallucination)
    Value { value: f64, explanation: String },
}

impl ScoreResult {
    pub fn score(score: f64, explanation: &str) -> Self {
        ScoreResult::Score {
            score,
            explanation: explanation.to_string(),
        }
    }

    pub fn value(value: f64, explanation: &str) -> Self {
        ScoreResult::Value {
            value,
            explanation: explanation.to_string(),
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            ScoreResult::Score { explanation, .. } | ScoreResult::Value { explanation, .. } => {
                explanation
            }
        }
    }
}

/// Evaluation payload: unwrapped for one metric, keyed by name otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evaluation {
    Single(ScoreResult),
    Multiple(IndexMap<String, ScoreResult>),
}

/// Response body of the evaluation endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub evaluation: Evaluation,
}

/// Response body of the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Error body returned for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
