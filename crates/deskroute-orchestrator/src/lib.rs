//! deskroute-orchestrator
//!
//! Query pipeline: route → retrieve per domain → generate or synthesize →
//! aggregate into one `FinalResponse`.
pub mod synthesizer;

use rayon::prelude::*;
use tracing::{info, warn};

use deskroute_core::config::Settings;
use deskroute_core::error::Result;
use deskroute_core::traits::AnswerGenerator;
use deskroute_core::types::{AnswerPath, Domain, DomainAnswer, FinalResponse, Intent, IntentDecision};
use deskroute_intent::IntentRouter;
use deskroute_text::index::DEFAULT_TOP_K;
use deskroute_text::RetrievalEngine;

pub use synthesizer::StructuredSynthesizer;

pub const UNCLASSIFIED_GUIDANCE: &str = "I'm not sure which department can best help with your query. Could you provide more details? You can contact HR for employee-related questions, IT Support for technical issues, or Finance for payment and expense questions.";

/// Owns the router and the per-domain indexes for the process lifetime.
/// Queries only read from it, so one instance can serve threads concurrently.
pub struct Orchestrator {
    router: IntentRouter,
    engine: RetrievalEngine,
    synthesizer: StructuredSynthesizer,
    generator: Option<Box<dyn AnswerGenerator>>,
    top_k: usize,
    parallel_domains: bool,
}

impl Orchestrator {
    pub fn new(router: IntentRouter, engine: RetrievalEngine) -> Self {
        Self {
            router,
            engine,
            synthesizer: StructuredSynthesizer::default(),
            generator: None,
            top_k: DEFAULT_TOP_K,
            parallel_domains: true,
        }
    }

    pub fn from_settings(settings: &Settings, router: IntentRouter, engine: RetrievalEngine) -> Self {
        Self::new(router, engine)
            .with_synthesizer(StructuredSynthesizer::new(&settings.synthesis))
            .with_top_k(settings.retrieval.top_k)
            .with_parallel_domains(settings.pipeline.parallel_domains)
    }

    pub fn with_generator(mut self, generator: Box<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: StructuredSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_parallel_domains(mut self, parallel: bool) -> Self {
        self.parallel_domains = parallel;
        self
    }

    pub fn router(&self) -> &IntentRouter { &self.router }

    pub fn engine(&self) -> &RetrievalEngine { &self.engine }

    pub fn top_k(&self) -> usize { self.top_k }

    pub fn has_generator(&self) -> bool { self.generator.is_some() }

    /// Retrieval plus generation (when available) or structured synthesis for
    /// one domain. Generator failure or blank output falls back to synthesis;
    /// an empty retrieval never reaches the generator.
    pub fn answer_domain(&self, domain: Domain, query: &str) -> Result<DomainAnswer> {
        let retrieved = self.engine.retrieve(domain, query, self.top_k)?;
        let source_ids: Vec<String> = retrieved.hits.iter().map(|h| h.chunk.id()).collect();
        let top_score = retrieved.top_score();

        if let Some(generator) = self.generator.as_ref().filter(|_| !retrieved.is_empty()) {
            match generator.generate(domain, query, &retrieved) {
                Ok(text) if !text.trim().is_empty() => {
                    return Ok(DomainAnswer {
                        domain,
                        path: AnswerPath::Generative,
                        text: text.trim().to_string(),
                        structured: None,
                        source_ids,
                        top_score,
                    });
                }
                Ok(_) => warn!(domain = %domain, "answer generator returned nothing; using structured fallback"),
                Err(e) => warn!(domain = %domain, "answer generator failed ({:#}); using structured fallback", e),
            }
        }

        let structured = self.synthesizer.synthesize(&retrieved);
        Ok(DomainAnswer {
            domain,
            path: AnswerPath::Fallback,
            text: structured.render(),
            structured: Some(structured),
            source_ids,
            top_score,
        })
    }

    /// Routes `query` and answers it. Only a missing domain index is an error;
    /// unclassified queries and empty retrievals produce terminal answers.
    pub fn answer(&self, query: &str) -> Result<FinalResponse> {
        let decision = self.router.classify(query);
        let Intent::Domain(primary) = decision.primary else {
            info!(query, "unclassified query");
            return Ok(unclassified(query, decision));
        };

        let domains = if decision.is_multi_domain { decision.all_matched_domains() } else { vec![primary] };
        // par_iter keeps input order, so answers follow the decision
        let answers: Vec<DomainAnswer> = if self.parallel_domains && domains.len() > 1 {
            domains.par_iter().map(|&d| self.answer_domain(d, query)).collect::<Result<_>>()?
        } else {
            domains.iter().map(|&d| self.answer_domain(d, query)).collect::<Result<_>>()?
        };

        let text = if decision.is_multi_domain {
            answers.iter().map(|a| format!("{}:\n{}", a.domain, a.text)).collect::<Vec<_>>().join("\n\n")
        } else {
            answers.first().map(|a| a.text.clone()).unwrap_or_default()
        };
        info!(
            intent = %decision.intent_label(),
            paths = ?answers.iter().map(|a| a.path).collect::<Vec<_>>(),
            "answered query"
        );
        let is_multi_domain = decision.is_multi_domain;
        Ok(FinalResponse { query: query.to_string(), decision, answers, text, is_multi_domain })
    }
}

fn unclassified(query: &str, decision: IntentDecision) -> FinalResponse {
    FinalResponse {
        query: query.to_string(),
        decision,
        answers: Vec::new(),
        text: UNCLASSIFIED_GUIDANCE.to_string(),
        is_multi_domain: false,
    }
}
