use crate::catalog::{is_storable_url, DocumentCatalog, DocumentRecord};
use crate::error::IndexError;
use crate::extract::extract;
use crate::index::write_line;
use crate::persist::IndexPaths;
use crate::{DocId, Posting};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// One crawled page as stored in the corpus tree.
#[derive(Debug, Deserialize)]
pub struct CorpusRecord {
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Indexed(DocId),
    Duplicate,
    Malformed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub indexed: u32,
    pub duplicates: usize,
    pub malformed: usize,
}

/// Everything before the first `#`. No other rewriting, so distinct strings stay distinct.
pub fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(base, _)| base)
}

/// Owns the docid counter, the seen-url set and the batch-local accumulator for one indexing run.
pub struct IndexingSession {
    paths: IndexPaths,
    batch_size: usize,
    next_doc_id: DocId,
    seen_urls: HashSet<String>,
    batch: HashMap<String, Vec<Posting>>,
    files_in_batch: usize,
    catalog: DocumentCatalog,
    chunks: Vec<PathBuf>,
    stats: SessionStats,
}

impl IndexingSession {
    pub fn new(paths: IndexPaths, batch_size: usize) -> Self {
        Self {
            paths,
            batch_size: batch_size.max(1),
            next_doc_id: 1,
            seen_urls: HashSet::new(),
            batch: HashMap::new(),
            files_in_batch: 0,
            catalog: DocumentCatalog::new(),
            chunks: Vec::new(),
            stats: SessionStats::default(),
        }
    }

    pub fn stats(&self) -> &SessionStats { &self.stats }

    pub fn catalog(&self) -> &DocumentCatalog { &self.catalog }

    pub fn chunks(&self) -> &[PathBuf] { &self.chunks }

    /// Assign a docid and accumulate postings, unless the url was seen before.
    pub fn add_record(&mut self, record: CorpusRecord) -> Result<Outcome> {
        let url = strip_fragment(&record.url);
        if !is_storable_url(url) {
            tracing::warn!(url = ?record.url, "skipping record whose url contains a line break");
            self.stats.malformed += 1;
            return Ok(Outcome::Malformed);
        }
        if self.seen_urls.contains(url) {
            self.stats.duplicates += 1;
            return Ok(Outcome::Duplicate);
        }

        let doc_id = self.next_doc_id;
        self.next_doc_id = doc_id.checked_add(1).ok_or(IndexError::DocIdOverflow)?;
        self.seen_urls.insert(url.to_string());
        self.stats.indexed += 1;

        let doc = extract(&record.content);
        self.catalog.insert(DocumentRecord { doc_id, vector_length: doc.vector_length, url: url.to_string() });
        for (term, stats) in doc.terms {
            self.batch.entry(term).or_default().push(Posting { doc_id, tf: stats.tf, tier: stats.tier });
        }
        Ok(Outcome::Indexed(doc_id))
    }

    /// Read one corpus file. Unreadable or malformed records are skipped with a warning.
    pub fn add_file(&mut self, path: &Path) -> Result<Outcome> {
        let outcome = match read_record(path) {
            Ok(record) => self.add_record(record)?,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping malformed record");
                self.stats.malformed += 1;
                Outcome::Malformed
            }
        };
        self.files_in_batch += 1;
        if self.files_in_batch >= self.batch_size {
            self.flush_chunk()?;
        }
        Ok(outcome)
    }

    /// Write the current batch as one term-sorted chunk file and clear the accumulator.
    pub fn flush_chunk(&mut self) -> Result<Option<PathBuf>> {
        self.files_in_batch = 0;
        if self.batch.is_empty() {
            return Ok(None);
        }
        fs::create_dir_all(self.paths.chunks_dir())?;
        let path = self.paths.chunk(self.chunks.len() + 1);
        let f = File::create(&path).with_context(|| format!("creating chunk {}", path.display()))?;
        let mut w = BufWriter::new(f);

        let mut terms: Vec<&String> = self.batch.keys().collect();
        terms.sort_unstable();
        for term in terms {
            write_line(&mut w, term, &self.batch[term])?;
        }
        w.flush()?;

        tracing::debug!(chunk = %path.display(), terms = self.batch.len(), "flushed chunk");
        self.batch.clear();
        self.chunks.push(path.clone());
        Ok(Some(path))
    }

    /// Walk the corpus tree in file-name order, flushing a chunk every `batch_size` files.
    pub fn index_corpus(&mut self, root: &Path) -> Result<()> {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walking corpus {}", root.display()))?;
            if entry.file_type().is_file() {
                self.add_file(entry.path())?;
            }
        }
        self.flush_chunk()?;
        Ok(())
    }

    /// Persist the catalog and hand back what the later phases need.
    pub fn finish(mut self) -> Result<(DocumentCatalog, Vec<PathBuf>, SessionStats)> {
        self.flush_chunk()?;
        self.catalog.save(&self.paths.catalog())?;
        Ok((self.catalog, self.chunks, self.stats))
    }
}

fn read_record(path: &Path) -> Result<CorpusRecord> {
    let f = File::open(path)?;
    let record = serde_json::from_reader(BufReader::new(f))?;
    Ok(record)
}
