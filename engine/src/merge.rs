//! Lazy k-way merge of term-sorted chunk files.
//!
//! Each source contributes its current head line to a min-heap keyed by
//! (leading term, source index). Popping the smallest head and refilling from
//! the same source yields one globally term-sorted stream in which every
//! occurrence of a term is contiguous. Equal terms come out in source order,
//! which is docid order because chunks are written in docid order.

use crate::error::IndexError;
use crate::index::leading_term;
use anyhow::{Context, Result};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct Head {
    line: String,
    term_len: usize,
    source: usize,
}

impl Head {
    fn term(&self) -> &str { &self.line[..self.term_len] }
}

// Equality follows the heap key only, so it agrees with `Ord`.
impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Head {}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        self.term().cmp(other.term()).then(self.source.cmp(&other.source))
    }
}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

struct Source<R> {
    lines: Lines<R>,
    last_term: Option<String>,
}

pub struct ChunkMerger<R: BufRead> {
    sources: Vec<Source<R>>,
    heap: BinaryHeap<Reverse<Head>>,
}

impl<R: BufRead> ChunkMerger<R> {
    pub fn new(readers: Vec<R>) -> Result<Self> {
        let mut merger = Self {
            sources: readers.into_iter().map(|r| Source { lines: r.lines(), last_term: None }).collect(),
            heap: BinaryHeap::new(),
        };
        for source in 0..merger.sources.len() {
            merger.refill(source)?;
        }
        Ok(merger)
    }

    /// Read the next line of `source` onto the heap. Terms inside one source must strictly increase.
    fn refill(&mut self, source: usize) -> Result<()> {
        let src = &mut self.sources[source];
        let Some(line) = src.lines.next() else { return Ok(()) };
        let line = line?;
        let term = leading_term(&line).ok_or_else(|| IndexError::MalformedLine(line.clone()))?;
        if !line.starts_with(term) {
            return Err(IndexError::MalformedLine(line).into());
        }
        if let Some(prev) = &src.last_term {
            if prev.as_str() >= term {
                return Err(IndexError::UnsortedTerms { previous: prev.clone(), next: term.to_string() }.into());
            }
        }
        let term_len = term.len();
        src.last_term = Some(term.to_string());
        self.heap.push(Reverse(Head { line, term_len, source }));
        Ok(())
    }
}

impl<R: BufRead> Iterator for ChunkMerger<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let Reverse(head) = self.heap.pop()?;
        if let Err(err) = self.refill(head.source) {
            self.heap.clear();
            return Some(Err(err));
        }
        Some(Ok(head.line))
    }
}

/// Open every chunk. The handles live only as long as the returned merger.
pub fn open_chunks(chunks: &[PathBuf]) -> Result<ChunkMerger<BufReader<File>>> {
    let readers = chunks
        .iter()
        .map(|p| File::open(p).map(BufReader::new).with_context(|| format!("opening chunk {}", p.display())))
        .collect::<Result<Vec<_>>>()?;
    ChunkMerger::new(readers)
}

/// Merge all chunks into `out`, one line per input line. Returns the number of lines written.
pub fn merge_chunks(chunks: &[PathBuf], out: &Path) -> Result<u64> {
    let merger = open_chunks(chunks)?;
    let f = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    let mut w = BufWriter::new(f);
    let mut lines = 0u64;
    for line in merger {
        w.write_all(line?.as_bytes())?;
        w.write_all(b"\n")?;
        lines += 1;
    }
    w.flush()?;
    tracing::info!(chunks = chunks.len(), lines, "merged chunks");
    Ok(lines)
}
