//! deskroute-text
//!
//! In-memory TF-IDF lexical index per domain (`index`), the tantivy analyzer
//! that feeds it (`tokenize`), and the domain-keyed retrieval engine
//! (`search`).
pub mod tokenize;
pub mod index;
pub mod search;

pub use index::LexicalIndex;
pub use search::RetrievalEngine;
