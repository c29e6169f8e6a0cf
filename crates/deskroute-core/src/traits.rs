//! Seams for the optional model-backed collaborators.
//!
//! Every pipeline path works without them; an `Err` from any of these is
//! logged by the caller and answered by the deterministic path instead.

use crate::types::{Domain, Evaluation, RetrievalResult};

/// Writes an answer from ranked passages. Empty output counts as failure.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, domain: Domain, query: &str, retrieved: &RetrievalResult) -> anyhow::Result<String>;
}

/// Single-label classification; `Ok(None)` means the model had no opinion.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, query: &str) -> anyhow::Result<Option<Domain>>;
}

pub trait ResponseEvaluator: Send + Sync {
    fn evaluate(&self, query: &str, answer: &str) -> anyhow::Result<Evaluation>;
}
