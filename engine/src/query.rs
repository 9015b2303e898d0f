//! Query-time ranking: tf-idf cosine similarity plus a structural tier boost.

use crate::catalog::DocumentCatalog;
use crate::error::IndexError;
use crate::extract::{term_frequencies, tf_weight};
use crate::index::Tier;
use crate::offset::{read_postings_at, OffsetTable};
use crate::persist::IndexPaths;
use crate::tokenizer::normalize;
use crate::{DocId, Posting};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// `log10(N / df)`; zero when the term is absent.
pub fn idf(num_docs: usize, df: usize) -> f64 {
    if df == 0 || num_docs == 0 { 0.0 } else { (num_docs as f64 / df as f64).log10() }
}

/// Sum of shared-term tiers scaled into [0, 1] by the largest possible sum.
pub fn tier_boost(tier_sum: u32, distinct_query_terms: usize) -> f64 {
    if distinct_query_terms == 0 { return 0.0; }
    tier_sum as f64 / (distinct_query_terms * Tier::MAX as usize) as f64
}

#[derive(Default)]
struct Accumulator {
    cosine: f64,
    tiers: u32,
}

pub struct QueryEngine {
    index: File,
    offsets: OffsetTable,
    catalog: DocumentCatalog,
}

impl QueryEngine {
    pub fn new(index: File, offsets: OffsetTable, catalog: DocumentCatalog) -> Self {
        Self { index, offsets, catalog }
    }

    /// Load the offset table and catalog into memory and keep the index open for seeks.
    pub fn open(paths: &IndexPaths) -> Result<Self> {
        let index = open_index(&paths.index())?;
        let offsets = OffsetTable::load(&paths.offsets())?;
        let catalog = DocumentCatalog::load(&paths.catalog())?;
        tracing::info!(terms = offsets.len(), docs = catalog.len(), "loaded index");
        Ok(Self::new(index, offsets, catalog))
    }

    pub fn catalog(&self) -> &DocumentCatalog { &self.catalog }

    /// Postings for one term, or an empty list when the term was never indexed.
    pub fn postings(&self, term: &str) -> Result<Vec<Posting>> {
        match self.offsets.get(term) {
            Some(offset) => read_postings_at(&self.index, offset, term),
            None => Ok(Vec::new()),
        }
    }

    /// Normalize free text and rank it. See [`QueryEngine::rank`].
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDoc>> {
        self.rank(normalize(query), k)
    }

    /// Score every document sharing a term with the query and return the best `k`,
    /// highest score first, ties by ascending docid.
    pub fn rank(&self, terms: Vec<String>, k: usize) -> Result<Vec<ScoredDoc>> {
        let query_tf = term_frequencies(terms);
        if query_tf.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let n = self.catalog.len();

        let mut fetched: Vec<(f64, Vec<Posting>)> = Vec::with_capacity(query_tf.len());
        for (term, &tf) in &query_tf {
            let postings = self.postings(term)?;
            if postings.is_empty() {
                continue;
            }
            let weight = tf_weight(tf) * idf(n, postings.len());
            fetched.push((weight, postings));
        }
        let query_length = fetched.iter().map(|(w, _)| w * w).sum::<f64>().sqrt();

        let mut acc: HashMap<DocId, Accumulator> = HashMap::new();
        for (weight, postings) in &fetched {
            let q = if query_length > 0.0 { weight / query_length } else { 0.0 };
            for p in postings {
                let doc_length = self
                    .catalog
                    .get(p.doc_id)
                    .map(|r| r.vector_length)
                    .ok_or(IndexError::UnknownDocument(p.doc_id))?;
                let entry = acc.entry(p.doc_id).or_default();
                if doc_length > 0.0 {
                    entry.cosine += q * tf_weight(p.tf) / doc_length;
                }
                entry.tiers += p.tier.value() as u32;
            }
        }

        let distinct = query_tf.len();
        let mut scored: Vec<ScoredDoc> = acc
            .into_iter()
            .map(|(doc_id, a)| ScoredDoc { doc_id, score: a.cosine + tier_boost(a.tiers, distinct) })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
        scored.truncate(k);
        Ok(scored)
    }
}

fn open_index(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening index {}", path.display()))
}
