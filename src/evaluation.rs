use crate::models::{Evaluation, EvaluationInput, EvaluationResponse, ScoreResult};
use indexmap::IndexMap;

const ANSWER_RELEVANCY: &str = "answer_relevancy";
const FAITHFULNESS: &str = "faithfulness";
const HALLUCINATION: &str = "hallucination";

/// Metrics that have a dedicated heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    AnswerRelevancy,
    Faithfulness,
    Hallucination,
    /// Any other name; scored neutrally
    Unrecognized,
}

impl Metric {
    /// Resolve a metric name. Names are matched exactly.
    pub fn from_name(name: &str) -> Self {
        match name {
            ANSWER_RELEVANCY => Metric::AnswerRelevancy,
            FAITHFULNESS => Metric::Faithfulness,
            HALLUCINATION => Metric::Hallucination,
            _ => Metric::Unrecognized,
        }
    }
}

/// Lowercased texts shared by all heuristics of one request
#[derive(Debug)]
struct ScoringTexts {
    query: String,
    output: String,
    /// Context fragments joined by single spaces
    context: String,
}

impl ScoringTexts {
    fn new(input: &EvaluationInput) -> Self {
        Self {
            query: input.query.to_lowercase(),
            output: input.output.to_lowercase(),
            context: input.context.join(" ").to_lowercase(),
        }
    }

    /// True when some output token occurs inside the joined context
    fn output_grounded_in_context(&self) -> bool {
        !self.context.is_empty() && any_token_contained(&self.output, &self.context)
    }
}

/// Returns true if any whitespace-separated token of `source` occurs as a
/// substring of `haystack`. Tokens are not matched against whole words.
fn any_token_contained(source: &str, haystack: &str) -> bool {
    source.split_whitespace().any(|token| haystack.contains(token))
}

/// Stateless heuristic evaluator
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    /// Create a new evaluator
    pub fn new() -> Self {
        Self
    }

    /// Score every requested metric and shape the response
    pub fn evaluate(&self, input: &EvaluationInput) -> EvaluationResponse {
        let texts = ScoringTexts::new(input);
        let results = self.score_all(&input.metrics, &texts);

        self.shape_response(&input.metrics, results)
    }

    /// Score each metric name, keyed by name in request order
    fn score_all(&self, metrics: &[String], texts: &ScoringTexts) -> IndexMap<String, ScoreResult> {
        let mut results = IndexMap::with_capacity(metrics.len());
        for name in metrics {
            results.insert(name.clone(), self.score_metric(name, texts));
        }
        results
    }

    /// Score a single metric by name
    fn score_metric(&self, name: &str, texts: &ScoringTexts) -> ScoreResult {
        match Metric::from_name(name) {
            Metric::AnswerRelevancy => self.answer_relevancy(texts),
            Metric::Faithfulness => self.faithfulness(texts),
            Metric::Hallucination => self.hallucination(texts),
            Metric::Unrecognized => self.neutral(),
        }
    }

    fn answer_relevancy(&self, texts: &ScoringTexts) -> ScoreResult {
        if any_token_contained(&texts.query, &texts.output) {
            ScoreResult::score(0.95, "Answer appears relevant to the query")
        } else {
            ScoreResult::score(0.5, "Answer may be unrelated")
        }
    }

    fn faithfulness(&self, texts: &ScoringTexts) -> ScoreResult {
        if texts.output_grounded_in_context() {
            ScoreResult::score(0.9, "Output matches provided context")
        } else {
            ScoreResult::score(0.3, "Output not grounded in context")
        }
    }

    /// Inverted polarity: 0.0 means no hallucination
    fn hallucination(&self, texts: &ScoringTexts) -> ScoreResult {
        if texts.output_grounded_in_context() {
            ScoreResult::value(0.0, "No obvious hallucination relative to context")
        } else {
            ScoreResult::value(0.8, "Potential hallucination: no supporting context found")
        }
    }

    fn neutral(&self) -> ScoreResult {
        ScoreResult::score(
            0.5,
            "metric not specifically implemented; returning neutral score",
        )
    }

    /// Unwrap the result when exactly one metric was requested
    fn shape_response(
        &self,
        metrics: &[String],
        mut results: IndexMap<String, ScoreResult>,
    ) -> EvaluationResponse {
        if metrics.len() == 1 {
            if let Some((_, result)) = results.pop() {
                return EvaluationResponse {
                    evaluation: Evaluation::Single(result),
                };
            }
        }

        EvaluationResponse {
            evaluation: Evaluation::Multiple(results),
        }
    }
}
