//! deskroute-llm
//!
//! OpenAI-compatible chat client and the optional model-backed collaborators:
//! answer generation, intent classification and response evaluation.
pub mod classifier;
pub mod client;
pub mod evaluator;
pub mod generator;

use std::sync::Arc;
use tracing::{info, warn};

use deskroute_core::config::Settings;
use deskroute_core::traits::{AnswerGenerator, IntentClassifier, ResponseEvaluator};

pub use classifier::LlmIntentClassifier;
pub use client::{ChatModel, OpenAiChatClient};
pub use evaluator::LlmEvaluator;
pub use generator::LlmAnswerGenerator;

/// Collaborators present for this process. Decided once at setup; an absent
/// collaborator is never consulted.
#[derive(Default)]
pub struct Collaborators {
    pub generator: Option<Box<dyn AnswerGenerator>>,
    pub classifier: Option<Box<dyn IntentClassifier>>,
    pub evaluator: Option<Box<dyn ResponseEvaluator>>,
}

impl Collaborators {
    pub fn offline() -> Self { Self::default() }

    /// Wires every collaborator the settings enable onto one shared model.
    pub fn with_model(model: Arc<dyn ChatModel>, settings: &Settings) -> Self {
        Self {
            generator: Some(Box::new(LlmAnswerGenerator::new(model.clone()))),
            classifier: settings
                .routing
                .use_model_classifier
                .then(|| Box::new(LlmIntentClassifier::new(model.clone())) as Box<dyn IntentClassifier>),
            evaluator: settings
                .evaluation
                .enabled
                .then(|| Box::new(LlmEvaluator::new(model)) as Box<dyn ResponseEvaluator>),
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        match OpenAiChatClient::from_settings(&settings.llm)? {
            Some(client) => {
                info!(model = client.model(), base_url = settings.llm.effective_base_url(), "model collaborators enabled");
                Ok(Self::with_model(Arc::new(client), settings))
            }
            None => {
                if settings.llm.enabled {
                    warn!("no API key configured (OPENAI_API_KEY / OPENROUTER_API_KEY); running offline");
                } else {
                    info!("model collaborators disabled; running offline");
                }
                Ok(Self::offline())
            }
        }
    }

    pub fn is_offline(&self) -> bool {
        self.generator.is_none() && self.classifier.is_none() && self.evaluator.is_none()
    }
}
