use std::collections::{HashMap, HashSet};
use tracing::debug;

use deskroute_core::config::SynthesisSettings;
use deskroute_core::section::plain_line;
use deskroute_core::types::{AnswerSection, Domain, RetrievalResult, StructuredAnswer};

/// Bucket for chunks without a detected heading.
pub const GENERAL_SECTION: &str = "General";
pub const NO_CONTENT_SECTION: &str = "No Relevant Content";

/// Deterministic, model-free answer composition from ranked chunks.
///
/// Sections appear in rank order of their first chunk. Lines are the chunk's
/// sentences, cleaned and capped; a line already emitted anywhere in the same
/// answer (compared case-folded) is suppressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredSynthesizer {
    max_line_chars: usize,
    max_lines_per_section: usize,
}

impl Default for StructuredSynthesizer {
    fn default() -> Self { Self::new(&SynthesisSettings::default()) }
}

impl StructuredSynthesizer {
    pub fn new(settings: &SynthesisSettings) -> Self {
        Self { max_line_chars: settings.max_line_chars.max(1), max_lines_per_section: settings.max_lines_per_section.max(1) }
    }

    pub fn synthesize(&self, retrieved: &RetrievalResult) -> StructuredAnswer {
        let domain = retrieved.domain;
        let Some(top) = retrieved.hits.first() else { return no_relevant_content(domain) };

        let mut sections: Vec<AnswerSection> = Vec::new();
        let mut section_index: HashMap<String, usize> = HashMap::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut suppressed = 0usize;

        for hit in &retrieved.hits {
            let label = hit.chunk.section_label.clone().unwrap_or_else(|| GENERAL_SECTION.to_string());
            let heading_key = dedup_key(label.trim_end_matches(':'));
            let idx = *section_index.entry(label.clone()).or_insert_with(|| {
                sections.push(AnswerSection { label, lines: Vec::new() });
                sections.len() - 1
            });

            for line in self.lines_of(&hit.chunk.text) {
                let key = dedup_key(&line);
                if dedup_key(line.trim_end_matches(':')) == heading_key { continue; }
                if sections[idx].lines.len() >= self.max_lines_per_section { break; }
                if !seen.insert(key) {
                    suppressed += 1;
                    continue;
                }
                sections[idx].lines.push(line);
            }
        }
        sections.retain(|s| !s.lines.is_empty());

        if sections.is_empty() {
            // every line was a heading; keep the top heading so the answer is never blank
            let label = top.chunk.section_label.clone().unwrap_or_else(|| GENERAL_SECTION.to_string());
            sections.push(AnswerSection { lines: vec![label.clone()], label });
        }

        debug!(domain = %domain, sections = sections.len(), suppressed, "synthesized structured answer");
        StructuredAnswer { domain, sections, chunks_used: retrieved.hits.iter().map(|h| h.chunk.clone()).collect() }
    }

    /// Cleaned, non-empty sentences of `text`, in order.
    pub fn lines_of(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(plain_line)
            .flat_map(split_sentences)
            .map(|s| self.clean_line(s))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Collapses whitespace and caps the line at `max_line_chars` chars.
    pub fn clean_line(&self, line: &str) -> String {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        match collapsed.char_indices().nth(self.max_line_chars) {
            Some((cut, _)) => collapsed[..cut].trim_end().to_string(),
            None => collapsed,
        }
    }
}

pub fn no_relevant_content(domain: Domain) -> StructuredAnswer {
    StructuredAnswer {
        domain,
        sections: vec![AnswerSection {
            label: NO_CONTENT_SECTION.to_string(),
            lines: vec![format!("No relevant content was found in the {} documentation for this query.", domain)],
        }],
        chunks_used: Vec::new(),
    }
}

fn dedup_key(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Splits after `.`, `!` or `?` when followed by whitespace.
fn split_sentences(line: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for (i, c) in line.char_indices() {
        if !matches!(c, '.' | '!' | '?') { continue; }
        let end = i + c.len_utf8();
        if line[end..].starts_with(char::is_whitespace) {
            sentences.push(&line[start..end]);
            start = end;
        }
    }
    if start < line.len() { sentences.push(&line[start..]); }
    sentences
}
