use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

/// Tokens shorter than this are dropped, matching the usual `\w\w+` rule.
pub const MIN_TOKEN_CHARS: usize = 2;
const MAX_TOKEN_BYTES: usize = 40;

const STOP_WORDS: &[&str] = &[
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
];

pub fn build_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| s.to_string())))
		.build()
}

/// Lowercased, stop-word-free terms of `text`, in order.
pub fn analyze(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut terms = Vec::new();
	let mut stream = analyzer.token_stream(text);
	while stream.advance() {
		let term = &stream.token().text;
		if term.chars().count() >= MIN_TOKEN_CHARS {
			terms.push(term.clone());
		}
	}
	terms
}
