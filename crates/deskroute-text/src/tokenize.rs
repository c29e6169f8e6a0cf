use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

/// Terms shorter than this many chars are dropped.
pub const MIN_TERM_CHARS: usize = 2;

pub const STOP_WORDS: &[&str] = &[
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having","my","me","our","we","you","your","i",
];

/// Alphanumeric runs, lowercased, stop words removed.
pub fn build_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| s.to_string())))
		.build()
}

/// Tokenizes `text` into index terms, in order of appearance.
pub fn tokenize(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut terms = Vec::new();
	let mut stream = analyzer.token_stream(text);
	while stream.advance() {
		let term = &stream.token().text;
		if term.chars().count() >= MIN_TERM_CHARS { terms.push(term.clone()); }
	}
	terms
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_on_non_alphanumerics_and_lowercases() {
		let mut analyzer = build_analyzer();
		assert_eq!(tokenize(&mut analyzer, "VPN-access: Reset_Password (v2)!"), vec!["vpn", "access", "reset", "password", "v2"]);
	}

	#[test]
	fn drops_stop_words_and_short_terms() {
		let mut analyzer = build_analyzer();
		assert_eq!(tokenize(&mut analyzer, "What are the vacation leave policies? x 7"), vec!["vacation", "leave", "policies"]);
	}
}
