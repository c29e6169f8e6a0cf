use deskroute_core::config::SynthesisSettings;
use deskroute_core::types::{Chunk, Domain, RetrievalHit, RetrievalResult};
use deskroute_orchestrator::synthesizer::{GENERAL_SECTION, NO_CONTENT_SECTION};
use deskroute_orchestrator::StructuredSynthesizer;

fn result(domain: Domain, texts: &[&str]) -> RetrievalResult {
    let hits = texts
        .iter()
        .enumerate()
        .map(|(row, text)| RetrievalHit {
            chunk: Chunk::new(domain, format!("doc{}.md", row), 0, *text),
            score: 1.0 - row as f32 * 0.1,
            row,
        })
        .collect();
    RetrievalResult { domain, hits }
}

fn hr_result() -> RetrievalResult {
    result(
        Domain::Hr,
        &[
            "Leave Policy\nEmployees receive 20 vacation days per year. Unused days roll over.",
            "Unused days roll over. Requests need manager approval.",
            "# Contacts\nEmail hr@example.com for questions.",
        ],
    )
}

#[test]
fn sections_follow_rank_order_of_first_appearance() {
    let answer = StructuredSynthesizer::default().synthesize(&hr_result());
    assert_eq!(answer.domain, Domain::Hr);
    assert_eq!(answer.section_labels(), vec!["Leave Policy", GENERAL_SECTION, "Contacts"]);
    assert_eq!(answer.sections[0].lines, vec!["Employees receive 20 vacation days per year.", "Unused days roll over."]);
    assert_eq!(answer.sections[2].lines, vec!["Email hr@example.com for questions."]);
    assert_eq!(answer.chunks_used.len(), 3);
}

#[test]
fn repeated_sentence_from_overlapping_chunks_appears_once() {
    let answer = StructuredSynthesizer::default().synthesize(&hr_result());
    let all_lines: Vec<&String> = answer.sections.iter().flat_map(|s| s.lines.iter()).collect();
    assert_eq!(all_lines.iter().filter(|l| l.as_str() == "Unused days roll over.").count(), 1);
    assert_eq!(answer.sections[1].lines, vec!["Requests need manager approval."]);
}

#[test]
fn dedup_ignores_case_and_spacing() {
    let answer = StructuredSynthesizer::default().synthesize(&result(
        Domain::Finance,
        &["Submit expense reports within 30 days.", "SUBMIT   expense reports\twithin 30 days."],
    ));
    assert_eq!(answer.line_count(), 1);
}

#[test]
fn heading_line_is_not_repeated_as_content() {
    let answer = StructuredSynthesizer::default().synthesize(&result(Domain::Tech, &["VPN Access:\n- Install the client.\n- Sign in with SSO."]));
    assert_eq!(answer.section_labels(), vec!["VPN Access"]);
    assert_eq!(answer.sections[0].lines, vec!["Install the client.", "Sign in with SSO."]);
}

#[test]
fn bulleted_or_emphasized_heading_is_not_repeated() {
    let answer = StructuredSynthesizer::default().synthesize(&result(
        Domain::Hr,
        &["- Sick Leave\nCall your manager before 9am.", "**Parental Leave**\nSixteen weeks are paid in full."],
    ));
    assert_eq!(answer.section_labels(), vec!["Sick Leave", "Parental Leave"]);
    assert_eq!(answer.sections[0].lines, vec!["Call your manager before 9am."]);
    assert_eq!(answer.sections[1].lines, vec!["Sixteen weeks are paid in full."]);
}

#[test]
fn heading_only_chunk_still_gives_an_answer() {
    let answer = StructuredSynthesizer::default().synthesize(&result(Domain::Hr, &["Leave Policy"]));
    assert!(!answer.is_empty());
    assert_eq!(answer.sections[0].lines, vec!["Leave Policy"]);
}

#[test]
fn lines_per_section_are_capped() {
    let synth = StructuredSynthesizer::new(&SynthesisSettings { max_line_chars: 240, max_lines_per_section: 2 });
    let answer = synth.synthesize(&result(Domain::Tech, &["One fact. Two fact. Three fact. Four fact."]));
    assert_eq!(answer.sections[0].lines, vec!["One fact.", "Two fact."]);
}

#[test]
fn empty_retrieval_gives_no_content_section() {
    let answer = StructuredSynthesizer::default().synthesize(&RetrievalResult::empty(Domain::Finance));
    assert_eq!(answer.section_labels(), vec![NO_CONTENT_SECTION]);
    assert_eq!(answer.sections[0].lines, vec!["No relevant content was found in the Finance documentation for this query."]);
    assert!(answer.chunks_used.is_empty());
}

#[test]
fn rendering_is_deterministic() {
    let synth = StructuredSynthesizer::default();
    let first = synth.synthesize(&hr_result());
    assert_eq!(first, synth.synthesize(&hr_result()));
    assert_eq!(
        first.render(),
        "HR Summary (offline extraction):\n\n\
         Leave Policy:\n- Employees receive 20 vacation days per year.\n- Unused days roll over.\n\n\
         General:\n- Requests need manager approval.\n\n\
         Contacts:\n- Email hr@example.com for questions."
    );
}
