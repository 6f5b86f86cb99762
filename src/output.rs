use crate::models::{Evaluation, EvaluationResponse, ScoreResult};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Print an evaluation response in the specified format.
///
/// `metrics` are the requested names, needed to label an unwrapped result.
pub fn print_response(
    response: &EvaluationResponse,
    metrics: &[String],
    format: OutputFormat,
) -> Result<()> {
    let rendered = match format {
        OutputFormat::Plain => render_plain(response, metrics),
        OutputFormat::Json => render_json(response)?,
    };
    println!("{}", rendered);
    Ok(())
}

/// Render results as one line per metric
fn render_plain(response: &EvaluationResponse, metrics: &[String]) -> String {
    match &response.evaluation {
        Evaluation::Single(result) => {
            let name = metrics.first().map(String::as_str).unwrap_or("evaluation");
            render_line(name, result)
        }
        Evaluation::Multiple(results) if results.is_empty() => "No metrics requested.".to_string(),
        Evaluation::Multiple(results) => results
            .iter()
            .map(|(name, result)| render_line(name, result))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_line(name: &str, result: &ScoreResult) -> String {
    match result {
        ScoreResult::Score { score, .. } => format!(
            "{:<18} score {:.3}  {}",
            name,
            score,
            result.explanation()
        ),
        ScoreResult::Value { value, .. } => format!(
            "{:<18} value {:.3}  {} (lower is better)",
            name,
            value,
            result.explanation()
        ),
    }
}

/// Render the exact HTTP response body, pretty-printed
fn render_json(response: &EvaluationResponse) -> Result<String> {
    serde_json::to_string_pretty(response).context("Failed to serialize evaluation to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn create_multiple_response() -> EvaluationResponse {
        let mut results = IndexMap::new();
        results.insert(
            "faithfulness".to_string(),
            ScoreResult::score(0.9, "Output matches provided context"),
        );
        results.insert(
            "hallucination".to_string(),
            ScoreResult::value(0.0, "No obvious hallucination relative to context"),
        );

        EvaluationResponse {
            evaluation: Evaluation::Multiple(results),
        }
    }

    #[test]
    fn test_plain_output_single_result() {
        let response = EvaluationResponse {
            evaluation: Evaluation::Single(ScoreResult::score(
                0.95,
                "Answer appears relevant to the query",
            )),
        };

        let rendered = render_plain(&response, &["answer_relevancy".to_string()]);
        assert!(rendered.starts_with("answer_relevancy"));
        assert!(rendered.contains("score 0.950"));
        assert!(rendered.contains("Answer appears relevant to the query"));
    }

    #[test]
    fn test_plain_output_multiple_results() {
        let response = create_multiple_response();
        let metrics = vec!["faithfulness".to_string(), "hallucination".to_string()];

        let rendered = render_plain(&response, &metrics);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("faithfulness"));
        assert!(lines[1].contains("value 0.000"));
        assert!(lines[1].ends_with("(lower is better)"));
    }

    #[test]
    fn test_plain_output_empty() {
        let response = EvaluationResponse {
            evaluation: Evaluation::Multiple(IndexMap::new()),
        };

        assert_eq!(render_plain(&response, &[]), "No metrics requested.");
    }

    #[test]
    fn test_json_output_matches_http_body() {
        let response = create_multiple_response();

        let rendered = render_json(&response).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["evaluation"]["faithfulness"]["score"], 0.9);
        assert_eq!(parsed["evaluation"]["hallucination"]["value"], 0.0);
    }

    #[test]
    fn test_print_response_formats() {
        let response = create_multiple_response();
        let metrics = vec!["faithfulness".to_string(), "hallucination".to_string()];

        print_response(&response, &metrics, OutputFormat::Plain).unwrap();
        print_response(&response, &metrics, OutputFormat::Json).unwrap();
    }
}
