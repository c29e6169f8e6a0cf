//! Domain types shared by the index, the router and the orchestrator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::section::detect_heading;

/// One of the document collections a query can be routed to.
///
/// Variant order is the declaration order used to break routing ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Hr,
    Tech,
    Finance,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Hr, Domain::Tech, Domain::Finance];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hr => "HR",
            Self::Tech => "Tech",
            Self::Finance => "Finance",
        }
    }

    /// Collection name used for the domain's corpus directory and logs.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Hr => "hr_docs",
            Self::Tech => "tech_docs",
            Self::Finance => "finance_docs",
        }
    }

    /// Lenient label parsing for model output and config keys.
    pub fn from_label(label: &str) -> Option<Self> {
        let cleaned = label
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '`')
            .to_ascii_lowercase();
        match cleaned.as_str() {
            "hr" | "human resources" => Some(Self::Hr),
            "tech" | "it" | "it/tech" | "technology" => Some(Self::Tech),
            "finance" | "financial" => Some(Self::Finance),
            _ => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| Error::NotFound(format!("unknown domain '{}'", s)))
    }
}

/// A passage of a source document, indexed independently.
///
/// - `source_id`: path of the source document relative to its corpus root
/// - `ordinal`: position of the chunk within its source document
/// - `section_label`: heading detected on the chunk's first line, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub domain: Domain,
    pub source_id: String,
    pub ordinal: usize,
    pub text: String,
    pub section_label: Option<String>,
}

impl Chunk {
    pub fn new(domain: Domain, source_id: impl Into<String>, ordinal: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let section_label = detect_heading(&text);
        Self { domain, source_id: source_id.into(), ordinal, text, section_label }
    }

    /// Stable identifier for logs and response attribution.
    pub fn id(&self) -> String {
        format!("{}#{}", self.source_id, self.ordinal)
    }
}

/// Ordered chunks of exactly one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    domain: Domain,
    chunks: Vec<Chunk>,
}

impl Corpus {
    /// Validates that every chunk belongs to `domain` and that ordinals
    /// strictly increase within each source document.
    pub fn new(domain: Domain, chunks: Vec<Chunk>) -> Result<Self> {
        let mut last_ordinal: HashMap<&str, usize> = HashMap::new();
        for chunk in &chunks {
            if chunk.domain != domain {
                return Err(Error::InvalidCorpus(format!(
                    "chunk {} belongs to {} but corpus is {}",
                    chunk.id(),
                    chunk.domain,
                    domain
                )));
            }
            if let Some(prev) = last_ordinal.insert(chunk.source_id.as_str(), chunk.ordinal) {
                if chunk.ordinal <= prev {
                    return Err(Error::InvalidCorpus(format!(
                        "ordinal {} follows {} in source '{}'",
                        chunk.ordinal, prev, chunk.source_id
                    )));
                }
            }
        }
        Ok(Self { domain, chunks })
    }

    pub fn empty(domain: Domain) -> Self {
        Self { domain, chunks: Vec::new() }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// A ranked chunk. `row` is the chunk's position in its corpus and is the
/// tie-breaker for equal scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub chunk: Chunk,
    pub score: f32,
    pub row: usize,
}

/// Top-K hits for one domain, score descending. Empty means "no relevant
/// content".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub domain: Domain,
    pub hits: Vec<RetrievalHit>,
}

impl RetrievalResult {
    pub fn empty(domain: Domain) -> Self {
        Self { domain, hits: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn top_score(&self) -> f32 {
        self.hits.first().map(|h| h.score).unwrap_or(0.0)
    }
}

/// Primary routing target of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Domain(Domain),
    Unclassified,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(d) => write!(f, "{}", d),
            Self::Unclassified => f.write_str("Unclassified"),
        }
    }
}

/// Keyword evidence for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMatch {
    pub domain: Domain,
    pub triggers: Vec<String>,
}

impl DomainMatch {
    pub fn count(&self) -> usize {
        self.triggers.len()
    }
}

/// Which signal chose the primary domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    Keywords,
    Model,
}

/// Router output. `matched` is ordered by descending match count, ties in
/// domain declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDecision {
    pub primary: Intent,
    pub matched: Vec<DomainMatch>,
    pub is_multi_domain: bool,
    pub source: DecisionSource,
}

impl IntentDecision {
    pub fn unclassified() -> Self {
        Self { primary: Intent::Unclassified, matched: Vec::new(), is_multi_domain: false, source: DecisionSource::Keywords }
    }

    pub fn all_matched_domains(&self) -> Vec<Domain> {
        self.matched.iter().map(|m| m.domain).collect()
    }

    pub fn is_unclassified(&self) -> bool {
        self.primary == Intent::Unclassified
    }

    /// Comma-joined domain labels, e.g. `Tech,Finance`.
    pub fn intent_label(&self) -> String {
        if self.is_multi_domain {
            self.matched.iter().map(|m| m.domain.label()).collect::<Vec<_>>().join(",")
        } else {
            self.primary.to_string()
        }
    }
}

/// A titled group of distinct lines in a fallback answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSection {
    pub label: String,
    pub lines: Vec<String>,
}

/// Deterministic answer composed from ranked chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnswer {
    pub domain: Domain,
    pub sections: Vec<AnswerSection>,
    pub chunks_used: Vec<Chunk>,
}

impl StructuredAnswer {
    pub fn section_labels(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.line_count() == 0
    }

    pub fn render(&self) -> String {
        let body = self
            .sections
            .iter()
            .map(|s| {
                let lines = s.lines.iter().map(|l| format!("- {}", l)).collect::<Vec<_>>().join("\n");
                format!("{}:\n{}", s.label, lines)
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{} Summary (offline extraction):\n\n{}", self.domain, body)
    }
}

/// Which path produced a domain answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerPath {
    Generative,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainAnswer {
    pub domain: Domain,
    pub path: AnswerPath,
    pub text: String,
    pub structured: Option<StructuredAnswer>,
    pub source_ids: Vec<String>,
    pub top_score: f32,
}

/// The single value returned for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResponse {
    pub query: String,
    pub decision: IntentDecision,
    pub answers: Vec<DomainAnswer>,
    pub text: String,
    pub is_multi_domain: bool,
}

impl FinalResponse {
    pub fn is_unclassified(&self) -> bool {
        self.decision.is_unclassified()
    }

    pub fn domains(&self) -> Vec<Domain> {
        self.answers.iter().map(|a| a.domain).collect()
    }
}

/// Quality scores produced by an optional evaluator, 1-10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub relevance: f32,
    pub relevance_comment: String,
    pub completeness: f32,
    pub completeness_comment: String,
    pub accuracy: f32,
    pub accuracy_comment: String,
    pub overall_score: f32,
}
