use std::collections::{BTreeMap, HashMap};
use tantivy::tokenizer::TextAnalyzer;
use tracing::debug;

use deskroute_core::types::{Chunk, Corpus, Domain, RetrievalHit, RetrievalResult};

use crate::tokenize::{build_analyzer, tokenize};

pub const DEFAULT_TOP_K: usize = 5;

/// Non-zero weights of one chunk, ascending by column.
#[derive(Debug, Clone, PartialEq)]
struct WeightedRow {
	entries: Vec<(usize, f32)>,
	norm: f32,
}

/// Read-only TF-IDF matrix over one corpus.
///
/// Row `i` is chunk `i` of the corpus. Columns are the distinct terms of the
/// corpus in lexicographic order, so building twice from the same corpus
/// yields the same vocabulary and weights.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalIndex {
	domain: Domain,
	chunks: Vec<Chunk>,
	terms: Vec<String>,
	columns: HashMap<String, usize>,
	idf: Vec<f32>,
	rows: Vec<WeightedRow>,
}

/// `ln((1 + n) / (1 + df)) + 1`; never zero.
pub fn smoothed_idf(chunk_count: usize, document_frequency: usize) -> f32 {
	((1.0 + chunk_count as f32) / (1.0 + document_frequency as f32)).ln() + 1.0
}

fn count_terms(analyzer: &mut TextAnalyzer, text: &str) -> BTreeMap<String, u32> {
	let mut counts = BTreeMap::new();
	for term in tokenize(analyzer, text) { *counts.entry(term).or_insert(0u32) += 1; }
	counts
}

impl LexicalIndex {
	pub fn build(corpus: &Corpus) -> Self {
		let mut analyzer = build_analyzer();
		let term_counts: Vec<BTreeMap<String, u32>> = corpus.chunks().iter().map(|c| count_terms(&mut analyzer, &c.text)).collect();

		let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
		for counts in &term_counts {
			for term in counts.keys() { *document_frequency.entry(term.as_str()).or_insert(0) += 1; }
		}
		let chunk_count = term_counts.len();
		let terms: Vec<String> = document_frequency.keys().map(|t| t.to_string()).collect();
		let idf: Vec<f32> = document_frequency.values().map(|&df| smoothed_idf(chunk_count, df)).collect();
		let columns: HashMap<String, usize> = terms.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect();

		// Raw counts are deliberately not length-normalized.
		let rows = term_counts
			.iter()
			.map(|counts| {
				let entries: Vec<(usize, f32)> = counts
					.iter()
					.filter_map(|(term, &tf)| columns.get(term.as_str()).map(|&col| (col, tf as f32 * idf[col])))
					.collect();
				let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
				WeightedRow { entries, norm }
			})
			.collect();

		debug!(domain = %corpus.domain(), chunks = chunk_count, vocabulary = terms.len(), "built lexical index");
		Self { domain: corpus.domain(), chunks: corpus.chunks().to_vec(), terms, columns, idf, rows }
	}

	/// Top `k` chunks by cosine similarity, score descending, ties by row.
	/// Zero-score chunks are never returned, so no vocabulary overlap gives an
	/// empty result.
	pub fn query(&self, text: &str, k: usize) -> RetrievalResult {
		if k == 0 || self.terms.is_empty() { return RetrievalResult::empty(self.domain); }

		let mut analyzer = build_analyzer();
		let query_vec: BTreeMap<usize, f32> = count_terms(&mut analyzer, text)
			.iter()
			.filter_map(|(term, &tf)| self.columns.get(term.as_str()).map(|&col| (col, tf as f32 * self.idf[col])))
			.collect();
		let query_norm = query_vec.values().map(|w| w * w).sum::<f32>().sqrt();
		if query_norm == 0.0 { return RetrievalResult::empty(self.domain); }

		let mut scored: Vec<(usize, f32)> = self
			.rows
			.iter()
			.enumerate()
			.filter_map(|(row, weights)| {
				if weights.norm == 0.0 { return None; }
				let dot: f32 = weights.entries.iter().filter_map(|(col, w)| query_vec.get(col).map(|q| w * q)).sum();
				let score = dot / (weights.norm * query_norm);
				(score > 0.0).then_some((row, score))
			})
			.collect();
		scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
		scored.truncate(k);

		let hits = scored.into_iter().map(|(row, score)| RetrievalHit { chunk: self.chunks[row].clone(), score, row }).collect();
		RetrievalResult { domain: self.domain, hits }
	}

	pub fn domain(&self) -> Domain { self.domain }

	pub fn len(&self) -> usize { self.rows.len() }

	pub fn is_empty(&self) -> bool { self.rows.is_empty() }

	/// Sorted vocabulary; position is the column index.
	pub fn vocabulary(&self) -> &[String] { &self.terms }

	pub fn idf(&self, term: &str) -> Option<f32> { self.columns.get(term).map(|&col| self.idf[col]) }

	/// `(term, weight)` pairs of one chunk, in vocabulary order.
	pub fn row_weights(&self, row: usize) -> Option<Vec<(&str, f32)>> {
		self.rows.get(row).map(|r| r.entries.iter().map(|&(col, w)| (self.terms[col].as_str(), w)).collect())
	}
}
