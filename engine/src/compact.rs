use crate::error::IndexError;
use crate::index::{merge_postings, PostingLine};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Fold consecutive same-term lines of a term-sorted stream into one line per term.
///
/// A single forward pass: lines for one term must be adjacent, and terms must
/// never go backwards. Returns the number of distinct terms written.
pub fn compact<I, W>(lines: I, out: &mut W) -> Result<u64>
where
    I: IntoIterator<Item = Result<String>>,
    W: Write,
{
    let mut current: Option<PostingLine> = None;
    let mut terms = 0u64;
    for line in lines {
        let line = line?;
        let next = PostingLine::parse(&line)?;
        current = match current.take() {
            Some(mut acc) if acc.term == next.term => {
                acc.postings = merge_postings(&acc.term, acc.postings, next.postings)?;
                Some(acc)
            }
            Some(acc) => {
                if acc.term > next.term {
                    return Err(IndexError::UnsortedTerms { previous: acc.term, next: next.term }.into());
                }
                acc.write_to(out)?;
                terms += 1;
                Some(next)
            }
            None => Some(next),
        };
    }
    if let Some(acc) = current {
        acc.write_to(out)?;
        terms += 1;
    }
    Ok(terms)
}

pub fn compact_file(merged: &Path, index: &Path) -> Result<u64> {
    let input = File::open(merged).with_context(|| format!("opening {}", merged.display()))?;
    let lines = BufReader::new(input).lines().map(|l| l.map_err(anyhow::Error::from));
    let f = File::create(index).with_context(|| format!("creating {}", index.display()))?;
    let mut w = BufWriter::new(f);
    let terms = compact(lines, &mut w)?;
    w.flush()?;
    tracing::info!(terms, index = %index.display(), "compacted postings");
    Ok(terms)
}
