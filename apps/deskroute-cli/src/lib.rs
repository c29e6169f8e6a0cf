//! Shared setup for the `deskroute` binaries: logging, settings, corpus
//! loading and the wiring of optional collaborators.
pub mod batch;
pub mod report;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use deskroute_core::config::{Config, Settings};
use deskroute_core::data_processor::DataProcessor;
use deskroute_core::traits::ResponseEvaluator;
use deskroute_core::types::{Corpus, Evaluation, FinalResponse};
use deskroute_intent::IntentRouter;
use deskroute_llm::Collaborators;
use deskroute_orchestrator::Orchestrator;
use deskroute_text::RetrievalEngine;

/// Used when `RUST_LOG` is unset: workspace crates at info, everything else
/// at warn. Directive targets match by prefix, so `deskroute` covers every
/// `deskroute_*` crate and both binaries.
pub const DEFAULT_LOG_FILTER: &str = "warn,deskroute=info";

/// Logs go to stderr so stdout carries only answers.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Command-line overrides applied on top of the layered settings.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub offline: bool,
    pub top_k: Option<usize>,
    pub no_evaluate: bool,
}

impl AppOptions {
    pub fn apply(&self, settings: &mut Settings) {
        if self.offline { settings.llm.enabled = false; }
        if let Some(top_k) = self.top_k { settings.retrieval.top_k = top_k; }
        if self.no_evaluate { settings.evaluation.enabled = false; }
    }
}

pub struct App {
    pub settings: Settings,
    pub corpora: Vec<Corpus>,
    pub orchestrator: Orchestrator,
    evaluator: Option<Box<dyn ResponseEvaluator>>,
}

impl App {
    pub fn load(options: &AppOptions) -> Result<Self> {
        let config = Config::load().context("loading configuration")?;
        let settings = config.settings().context("reading settings")?;
        Self::from_settings(settings, options)
    }

    pub fn from_settings(mut settings: Settings, options: &AppOptions) -> Result<Self> {
        options.apply(&mut settings);
        settings.validate()?;

        let corpora = DataProcessor::from_settings(&settings).load_all(&settings)?;
        let engine = RetrievalEngine::build(&corpora);
        let collaborators = Collaborators::from_settings(&settings)?;

        let mut router = IntentRouter::from_settings(&settings.routing);
        if let Some(classifier) = collaborators.classifier { router = router.with_classifier(classifier); }
        let mut orchestrator = Orchestrator::from_settings(&settings, router, engine);
        if let Some(generator) = collaborators.generator { orchestrator = orchestrator.with_generator(generator); }

        info!(
            chunks = corpora.iter().map(Corpus::len).sum::<usize>(),
            generative = orchestrator.has_generator(),
            "deskroute ready"
        );
        Ok(Self { settings, corpora, orchestrator, evaluator: collaborators.evaluator })
    }

    /// Replaces whatever evaluator the settings produced.
    pub fn with_evaluator(mut self, evaluator: Box<dyn ResponseEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn has_evaluator(&self) -> bool { self.evaluator.is_some() }

    /// Scores answered queries; unclassified guidance is never evaluated.
    /// Evaluator failures are logged and yield `None`.
    pub fn evaluate(&self, response: &FinalResponse) -> Option<Evaluation> {
        let evaluator = self.evaluator.as_ref()?;
        if response.is_unclassified() { return None; }
        match evaluator.evaluate(&response.query, &response.text) {
            Ok(evaluation) => Some(evaluation),
            Err(e) => {
                warn!("evaluation failed: {:#}", e);
                None
            }
        }
    }
}
