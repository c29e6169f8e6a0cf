use std::collections::BTreeMap;
use tracing::debug;

use deskroute_core::error::{Error, Result};
use deskroute_core::types::{Corpus, Domain, RetrievalResult};

use crate::index::LexicalIndex;

/// Owns one lexical index per domain. Indexes are read-only once built, so a
/// shared `&RetrievalEngine` serves concurrent queries without locking.
#[derive(Debug, Clone, Default)]
pub struct RetrievalEngine {
	indexes: BTreeMap<Domain, LexicalIndex>,
}

impl RetrievalEngine {
	pub fn new() -> Self { Self::default() }

	pub fn build<'a, I>(corpora: I) -> Self
	where
		I: IntoIterator<Item = &'a Corpus>,
	{
		let mut engine = Self::new();
		for corpus in corpora { engine.rebuild(corpus); }
		engine
	}

	/// Builds (or replaces) the index for the corpus's domain and returns the
	/// previous one.
	pub fn rebuild(&mut self, corpus: &Corpus) -> Option<LexicalIndex> {
		self.indexes.insert(corpus.domain(), LexicalIndex::build(corpus))
	}

	/// Fails with `DomainNotIndexed` when `domain` was never built; that is a
	/// wiring bug, not an empty result.
	pub fn retrieve(&self, domain: Domain, query: &str, k: usize) -> Result<RetrievalResult> {
		let index = self.indexes.get(&domain).ok_or(Error::DomainNotIndexed(domain))?;
		let result = index.query(query, k);
		debug!(domain = %domain, hits = result.len(), top_score = result.top_score(), "retrieved");
		Ok(result)
	}

	pub fn index(&self, domain: Domain) -> Option<&LexicalIndex> { self.indexes.get(&domain) }

	pub fn domains(&self) -> Vec<Domain> { self.indexes.keys().copied().collect() }
}
