use serde::Serialize;

use deskroute_core::types::{AnswerPath, Domain, Evaluation, FinalResponse};

use crate::App;

/// `--json` payload of `deskroute ask`.
#[derive(Debug, Serialize)]
pub struct AskOutput<'a> {
    #[serde(flatten)]
    pub response: &'a FinalResponse,
    pub evaluation: Option<&'a Evaluation>,
}

pub fn path_label(path: AnswerPath) -> &'static str {
    match path {
        AnswerPath::Generative => "generative",
        AnswerPath::Fallback => "fallback",
    }
}

pub fn render_answer(response: &FinalResponse, evaluation: Option<&Evaluation>) -> String {
    let mut lines = vec![format!("Intent: {}", response.decision.intent_label())];
    if !response.answers.is_empty() {
        let paths: Vec<String> = response.answers.iter().map(|a| format!("{}={}", a.domain, path_label(a.path))).collect();
        lines.push(format!("Path: {}", paths.join(", ")));
        let sources: Vec<&str> = response.answers.iter().flat_map(|a| a.source_ids.iter().map(String::as_str)).collect();
        if !sources.is_empty() { lines.push(format!("Sources: {}", sources.join(", "))); }
    }
    lines.push(String::new());
    lines.push(response.text.clone());
    if let Some(e) = evaluation {
        lines.push(String::new());
        lines.push(format!(
            "Evaluation: overall {:.1}/10 (relevance {:.0}, completeness {:.0}, accuracy {:.0})",
            e.overall_score, e.relevance, e.completeness, e.accuracy
        ));
    }
    lines.join("\n") + "\n"
}

pub fn render_info(app: &App) -> String {
    let s = &app.settings;
    let mut lines = vec!["Domains:".to_string()];
    for domain in Domain::ALL {
        let chunks = app.corpora.iter().find(|c| c.domain() == domain).map_or(0, |c| c.len());
        let vocabulary = app.orchestrator.engine().index(domain).map_or(0, |i| i.vocabulary().len());
        lines.push(format!(
            "  {:<8} {:<13} chunks={:<5} vocabulary={:<6} dir={}",
            domain.label(),
            domain.collection(),
            chunks,
            vocabulary,
            s.data.dir_for(domain).display()
        ));
    }
    lines.push(format!("Retrieval: top_k={} chunk_size={} chunk_overlap={}", s.retrieval.top_k, s.chunking.chunk_size, s.chunking.chunk_overlap));
    let model = if s.llm.is_available() { format!("{} via {}", s.llm.model, s.llm.effective_base_url()) } else { "offline".to_string() };
    lines.push(format!("Model: {}", model));
    lines.push(format!(
        "Collaborators: generator={} classifier={} evaluator={}",
        app.orchestrator.has_generator(),
        app.orchestrator.router().has_classifier(),
        app.has_evaluator()
    ));
    lines.push(format!("Parallel domains: {}", s.pipeline.parallel_domains));
    lines.join("\n") + "\n"
}
