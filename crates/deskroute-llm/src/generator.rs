use anyhow::{bail, Result};
use std::sync::Arc;

use deskroute_core::traits::AnswerGenerator;
use deskroute_core::types::{Domain, RetrievalResult};

use crate::client::ChatModel;

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

pub fn system_prompt(domain: Domain) -> String {
    format!(
        "You are a specialized {} assistant for a SaaS company.\n\
         Your role is to provide accurate, helpful, and actionable answers strictly based on the company's internal documentation.\n\n\
         Instructions:\n\
         - Answer ONLY using the provided context; do not invent details.\n\
         - If the context lacks specifics, explicitly state what is unknown.\n\
         - Prefer structured steps, bullets, and concrete details (numbers, timelines, contacts) when available.\n\
         - End with a short, clear next-step if appropriate.",
        domain
    )
}

/// Ranked chunks in rank order, each tagged with its source.
pub fn render_context(retrieved: &RetrievalResult) -> String {
    retrieved
        .hits
        .iter()
        .map(|h| format!("[{}]\n{}", h.chunk.source_id, h.chunk.text.trim()))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Retrieval-augmented answers from a chat model.
pub struct LlmAnswerGenerator {
    model: Arc<dyn ChatModel>,
}

impl LlmAnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self { Self { model } }
}

impl AnswerGenerator for LlmAnswerGenerator {
    fn generate(&self, domain: Domain, query: &str, retrieved: &RetrievalResult) -> Result<String> {
        let user = format!(
            "Context:\n{}\n\nQuestion:\n{}\n\nNow provide a precise, complete, and actionable answer based on the context above.",
            render_context(retrieved),
            query
        );
        let answer = self.model.complete(&system_prompt(domain), &user)?;
        let answer = answer.trim();
        if answer.is_empty() { bail!("model returned an empty answer"); }
        Ok(answer.to_string())
    }
}
