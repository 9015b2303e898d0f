use crate::html::{Page, Tag};
use crate::index::Tier;
use crate::tokenizer::normalize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermStats {
    pub tf: u32,
    pub tier: Tier,
}

/// Per-document output of term extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    pub terms: BTreeMap<String, TermStats>, // ordered, so the length sum is reproducible
    pub vector_length: f64,
}

/// Log-dampened term frequency, `1 + log10(tf)`.
pub fn tf_weight(tf: u32) -> f64 {
    if tf == 0 { 0.0 } else { 1.0 + (tf as f64).log10() }
}

/// Euclidean length of the document's log-tf vector.
pub fn vector_length<'a, I: IntoIterator<Item = &'a u32>>(tfs: I) -> f64 {
    tfs.into_iter().map(|&tf| tf_weight(tf).powi(2)).sum::<f64>().sqrt()
}

fn tier_for(tag: Tag) -> Tier {
    match tag {
        Tag::Title => Tier::Title,
        Tag::H1 => Tier::H1,
        Tag::H2 => Tier::H2,
        Tag::H3 => Tier::H3,
        Tag::Bold => Tier::Bold,
    }
}

pub fn term_frequencies(terms: Vec<String>) -> BTreeMap<String, u32> {
    let mut freq = BTreeMap::new();
    for term in terms {
        *freq.entry(term).or_insert(0) += 1;
    }
    freq
}

/// Extract terms, raw counts, tiers and vector length from one HTML document.
pub fn extract(html: &str) -> ExtractedDocument {
    let page = Page::parse(html);
    let freq = term_frequencies(normalize(&page.text()));
    let vector_length = vector_length(freq.values());

    let categories: Vec<(Tier, HashSet<String>)> = Tag::ALL
        .iter()
        .map(|&tag| {
            let terms = page.texts_by_tag(tag).iter().flat_map(|t| normalize(t)).collect();
            (tier_for(tag), terms)
        })
        .collect();

    let terms = freq
        .into_iter()
        .map(|(term, tf)| {
            let tier = categories
                .iter()
                .filter(|(_, set)| set.contains(&term))
                .map(|(tier, _)| *tier)
                .max()
                .unwrap_or_default();
            (term, TermStats { tf, tier })
        })
        .collect();

    ExtractedDocument { terms, vector_length }
}
