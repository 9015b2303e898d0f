use crate::error::IndexError;
use crate::index::{leading_term, PostingLine};
use crate::Posting;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Record the byte position of every line of the compacted index, in file order.
/// Returns the number of entries written.
pub fn build_offsets<R: BufRead, W: Write>(mut index: R, out: &mut W) -> Result<u64> {
    let mut pos = 0u64;
    let mut entries = 0u64;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = index.read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        let line = std::str::from_utf8(&buf)?;
        let term = leading_term(line).ok_or_else(|| IndexError::MalformedLine(line.to_string()))?;
        writeln!(out, "{term} {pos}")?;
        pos += read as u64;
        entries += 1;
    }
    Ok(entries)
}

pub fn build_offset_file(index: &Path, offsets: &Path) -> Result<u64> {
    let input = File::open(index).with_context(|| format!("opening {}", index.display()))?;
    let f = File::create(offsets).with_context(|| format!("creating {}", offsets.display()))?;
    let mut w = BufWriter::new(f);
    let entries = build_offsets(BufReader::new(input), &mut w)?;
    w.flush()?;
    tracing::info!(entries, offsets = %offsets.display(), "built offset table");
    Ok(entries)
}

/// term -> byte offset of its line in the compacted index.
#[derive(Debug, Default)]
pub struct OffsetTable {
    offsets: HashMap<String, u64>,
}

impl OffsetTable {
    pub fn get(&self, term: &str) -> Option<u64> { self.offsets.get(term).copied() }

    pub fn len(&self) -> usize { self.offsets.len() }

    pub fn is_empty(&self) -> bool { self.offsets.is_empty() }

    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut offsets = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() { continue; }
            let malformed = || IndexError::MalformedOffset(line.clone());
            let (term, pos) = line.split_once(' ').ok_or_else(malformed)?;
            let pos: u64 = pos.parse().map_err(|_| malformed())?;
            offsets.insert(term.to_string(), pos);
        }
        Ok(Self { offsets })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("opening offset table {}", path.display()))?;
        Self::read_from(BufReader::new(f)).with_context(|| format!("reading {}", path.display()))
    }
}

/// Seek to `offset` and parse the single line found there, which must belong to `term`.
pub fn read_postings_at<R: Read + Seek>(index: R, offset: u64, term: &str) -> Result<Vec<Posting>> {
    let mut reader = BufReader::new(index);
    reader.seek(SeekFrom::Start(offset))?;
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let parsed = PostingLine::parse(line.trim_end())?;
    if parsed.term != term {
        return Err(IndexError::OffsetMismatch { expected: term.to_string(), found: parsed.term, offset }.into());
    }
    Ok(parsed.postings)
}
