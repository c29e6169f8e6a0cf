use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use deskroute_core::traits::IntentClassifier;
use deskroute_core::types::Domain;

use crate::client::ChatModel;

const SYSTEM_PROMPT: &str = "You are an intent classification system for a customer support routing system.
Your task is to classify user queries into one of these categories:
- HR: Questions about benefits, leave policies, employee policies, hiring, onboarding, performance reviews, workplace issues
- Tech: Questions about software, hardware, IT support, system access, technical troubleshooting, software licenses
- Finance: Questions about expenses, invoices, budgets, payments, financial policies, reimbursement

Respond with ONLY the category name (HR, Tech, or Finance). If the query doesn't clearly fit any category, respond with \"Unknown\".";

/// First non-blank line of the reply as a domain label; `Unknown` and
/// anything unrecognised map to `None`.
pub fn parse_intent_label(reply: &str) -> Option<Domain> {
    reply.lines().map(str::trim).find(|l| !l.is_empty()).and_then(Domain::from_label)
}

pub struct LlmIntentClassifier {
    model: Arc<dyn ChatModel>,
}

impl LlmIntentClassifier {
    pub fn new(model: Arc<dyn ChatModel>) -> Self { Self { model } }
}

impl IntentClassifier for LlmIntentClassifier {
    fn classify(&self, query: &str) -> Result<Option<Domain>> {
        let reply = self.model.complete(SYSTEM_PROMPT, query)?;
        let label = parse_intent_label(&reply);
        debug!(reply = reply.trim(), label = ?label, "model intent");
        Ok(label)
    }
}
