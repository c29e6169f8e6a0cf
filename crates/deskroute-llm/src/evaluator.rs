use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::sync::Arc;

use deskroute_core::traits::ResponseEvaluator;
use deskroute_core::types::Evaluation;

use crate::client::ChatModel;

const SYSTEM_PROMPT: &str = r#"You are a quality evaluator for customer support responses.
Evaluate the response based on the original query and provide scores (1-10) for:
1. Relevance: How well does the answer address the query?
2. Completeness: Does the answer fully address all aspects of the query?
3. Accuracy: Is the answer factually correct and based on the provided context?

Respond in JSON format with scores and a brief comment for each dimension:
{
    "relevance": <score 1-10>,
    "relevance_comment": "<brief explanation>",
    "completeness": <score 1-10>,
    "completeness_comment": "<brief explanation>",
    "accuracy": <score 1-10>,
    "accuracy_comment": "<brief explanation>",
    "overall_score": <average of three scores>
}"#;

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    relevance: f32,
    #[serde(default)]
    relevance_comment: String,
    completeness: f32,
    #[serde(default)]
    completeness_comment: String,
    accuracy: f32,
    #[serde(default)]
    accuracy_comment: String,
    overall_score: Option<f32>,
}

/// Parses the JSON object spanning the first `{` to the last `}` of `reply`.
pub fn parse_evaluation(reply: &str) -> Result<Evaluation> {
    let start = reply.find('{').ok_or_else(|| anyhow!("no JSON object in evaluator reply"))?;
    let end = reply.rfind('}').filter(|&e| e > start).ok_or_else(|| anyhow!("unterminated JSON object in evaluator reply"))?;
    let raw: RawEvaluation = serde_json::from_str(&reply[start..=end]).context("parsing evaluator JSON")?;
    let overall_score = raw.overall_score.unwrap_or((raw.relevance + raw.completeness + raw.accuracy) / 3.0);
    Ok(Evaluation {
        relevance: raw.relevance,
        relevance_comment: raw.relevance_comment,
        completeness: raw.completeness,
        completeness_comment: raw.completeness_comment,
        accuracy: raw.accuracy,
        accuracy_comment: raw.accuracy_comment,
        overall_score,
    })
}

/// LLM-as-judge scoring of a final answer.
pub struct LlmEvaluator {
    model: Arc<dyn ChatModel>,
}

impl LlmEvaluator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self { Self { model } }
}

impl ResponseEvaluator for LlmEvaluator {
    fn evaluate(&self, query: &str, answer: &str) -> Result<Evaluation> {
        let user = format!("Original Query: {}\n\nResponse: {}\n\nEvaluate the response quality:", query, answer);
        let reply = self.model.complete(SYSTEM_PROMPT, &user)?;
        parse_evaluation(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_wrapped_in_prose() {
        let reply = "Here is my evaluation:\n```json\n{\"relevance\": 8, \"relevance_comment\": \"on topic\", \"completeness\": 6, \"completeness_comment\": \"misses contacts\", \"accuracy\": 9, \"accuracy_comment\": \"grounded\", \"overall_score\": 7.7}\n```";
        let eval = parse_evaluation(reply).unwrap();
        assert_eq!(eval.relevance, 8.0);
        assert_eq!(eval.completeness_comment, "misses contacts");
        assert!((eval.overall_score - 7.7).abs() < 1e-6);
    }

    #[test]
    fn missing_overall_is_the_average() {
        let eval = parse_evaluation(r#"{"relevance": 9, "completeness": 6, "accuracy": 6}"#).unwrap();
        assert!((eval.overall_score - 7.0).abs() < 1e-6);
        assert!(eval.accuracy_comment.is_empty());
    }

    #[test]
    fn rejects_replies_without_json() {
        assert!(parse_evaluation("The answer looks fine.").is_err());
        assert!(parse_evaluation("} backwards {").is_err());
        assert!(parse_evaluation(r#"{"relevance": "high"}"#).is_err());
    }
}
