use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Normalize text into stemmed terms: NFKC, lowercase, split on non-word runs, stem.
/// Every token is kept, including stopwords, so that query and index agree term for term.
pub fn normalize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    WORD.find_iter(&normalized)
        .map(|m| STEMMER.stem(m.as_str()).into_owned())
        .collect()
}
