use crate::error::IndexError;
use crate::DocId;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub doc_id: DocId,
    pub vector_length: f64,
    pub url: String, // fragment stripped
}

/// A url fits on one catalog line: anything goes except line breaks.
pub fn is_storable_url(url: &str) -> bool {
    !url.contains(['\n', '\r'])
}

/// docid -> (vector length, url), kept in docid order.
#[derive(Debug, Default, Clone)]
pub struct DocumentCatalog {
    records: BTreeMap<DocId, DocumentRecord>,
}

impl DocumentCatalog {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, record: DocumentRecord) {
        self.records.insert(record.doc_id, record);
    }

    pub fn get(&self, doc_id: DocId) -> Option<&DocumentRecord> { self.records.get(&doc_id) }

    pub fn url(&self, doc_id: DocId) -> Option<&str> { self.get(doc_id).map(|r| r.url.as_str()) }

    /// Total document count, the N of idf.
    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentRecord> { self.records.values() }

    /// One `docid vector-length url` line per document, ascending by docid.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        for r in self.records.values() {
            writeln!(w, "{} {} {}", r.doc_id, r.vector_length, r.url)?;
        }
        Ok(())
    }

    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut catalog = Self::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() { continue; }
            catalog.insert(parse_record(&line)?);
        }
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut w = BufWriter::new(f);
        self.write_to(&mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("opening document catalog {}", path.display()))?;
        Self::read_from(BufReader::new(f)).with_context(|| format!("reading {}", path.display()))
    }
}

fn parse_record(line: &str) -> Result<DocumentRecord, IndexError> {
    let malformed = || IndexError::MalformedCatalog(line.to_string());
    let mut fields = line.splitn(3, ' ');
    let (Some(id), Some(len), Some(url)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(malformed());
    };
    let doc_id = id.parse().map_err(|_| malformed())?;
    let vector_length = len.parse().map_err(|_| malformed())?;
    Ok(DocumentRecord { doc_id, vector_length, url: url.to_string() })
}
