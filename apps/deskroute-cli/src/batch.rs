//! Routing regression runs over a JSON list of queries.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use deskroute_core::types::{AnswerPath, Domain, Evaluation};

use crate::App;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QueryEntry {
    Labeled {
        query: String,
        #[serde(default)]
        expected_intent: Option<String>,
    },
    Bare(String),
}

#[derive(Debug, Deserialize)]
struct QueryFile {
    #[serde(default, alias = "queries")]
    test_queries: Vec<QueryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestQuery {
    pub query: String,
    pub expected_intent: Option<String>,
}

impl From<QueryEntry> for TestQuery {
    fn from(entry: QueryEntry) -> Self {
        match entry {
            QueryEntry::Labeled { query, expected_intent } => Self { query, expected_intent },
            QueryEntry::Bare(query) => Self { query, expected_intent: None },
        }
    }
}

/// Accepts `{"test_queries": [...]}`, `{"queries": [...]}` or a bare array;
/// entries are `{"query", "expected_intent"}` objects or plain strings.
pub fn parse_queries(json: &str) -> Result<Vec<TestQuery>> {
    let value: serde_json::Value = serde_json::from_str(json).context("query file is not valid JSON")?;
    let entries: Vec<QueryEntry> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        serde_json::from_value::<QueryFile>(value)?.test_queries
    };
    Ok(entries.into_iter().map(TestQuery::from).collect())
}

pub fn load_queries(path: &Path) -> Result<Vec<TestQuery>> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_queries(&json)
}

/// Exact or case-insensitive containment match of the expected label in the
/// reported one (`Tech` matches `Tech,Finance`). `IT` is read as `Tech` and
/// `Unknown` as `Unclassified`.
pub fn intent_matches(expected: &str, reported: &str) -> bool {
    let expected = expected.trim();
    let expected = if expected.eq_ignore_ascii_case("unknown") {
        "unclassified".to_string()
    } else {
        Domain::from_label(expected).map_or_else(|| expected.to_lowercase(), |d| d.label().to_lowercase())
    };
    reported.to_lowercase().contains(&expected)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    /// 1-based position in the query file.
    pub id: usize,
    pub query: String,
    pub expected: Option<String>,
    pub reported: Option<String>,
    pub paths: Vec<AnswerPath>,
    pub matched: Option<bool>,
    pub evaluation: Option<Evaluation>,
    pub error: Option<String>,
}

/// One routing miss, as written by `--misclassifications`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Misclassification {
    pub id: usize,
    pub query: String,
    pub expected: String,
    pub predicted: String,
    pub evaluation: Option<Evaluation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize { self.outcomes.len() }

    pub fn matches(&self) -> usize { self.outcomes.iter().filter(|o| o.matched == Some(true)).count() }

    /// Matches over all queries, in percent.
    pub fn accuracy(&self) -> f64 {
        if self.outcomes.is_empty() { return 0.0; }
        self.matches() as f64 / self.total() as f64 * 100.0
    }

    /// Labelled queries that were answered under the wrong intent.
    pub fn misclassifications(&self) -> Vec<Misclassification> {
        self.outcomes
            .iter()
            .filter(|o| o.matched == Some(false))
            .map(|o| Misclassification {
                id: o.id,
                query: o.query.clone(),
                expected: o.expected.clone().unwrap_or_default(),
                predicted: o.reported.clone().unwrap_or_default(),
                evaluation: o.evaluation.clone(),
            })
            .collect()
    }

    /// Writes [`Self::misclassifications`] as a JSON array and returns how many
    /// were written. An empty array is written when every query matched.
    pub fn write_misclassifications(&self, path: &Path) -> Result<usize> {
        let misses = self.misclassifications();
        let json = serde_json::to_string_pretty(&misses)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(misses.len())
    }
}

/// Answers every query; a failing query is recorded and the run continues.
/// Answers are scored when the app carries an evaluator.
pub fn run_batch(app: &App, queries: &[TestQuery]) -> BatchReport {
    let outcomes = queries
        .iter()
        .enumerate()
        .map(|(i, tq)| match app.orchestrator.answer(&tq.query) {
            Ok(response) => {
                let reported = response.decision.intent_label();
                BatchOutcome {
                    id: i + 1,
                    query: tq.query.clone(),
                    expected: tq.expected_intent.clone(),
                    matched: tq.expected_intent.as_deref().map(|e| intent_matches(e, &reported)),
                    reported: Some(reported),
                    paths: response.answers.iter().map(|a| a.path).collect(),
                    evaluation: app.evaluate(&response),
                    error: None,
                }
            }
            Err(e) => {
                warn!(query = %tq.query, "query failed: {}", e);
                BatchOutcome {
                    id: i + 1,
                    query: tq.query.clone(),
                    expected: tq.expected_intent.clone(),
                    reported: None,
                    paths: Vec::new(),
                    matched: None,
                    evaluation: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();
    BatchReport { outcomes }
}
