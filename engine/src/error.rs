use thiserror::Error;

use crate::DocId;

/// Integrity violations found while reading artifacts this crate wrote itself.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("malformed posting `{0}`")]
    MalformedPosting(String),

    #[error("invalid tier {0}, expected 1..=6")]
    InvalidTier(u8),

    #[error("malformed line: {0:?}")]
    MalformedLine(String),

    #[error("postings for `{term}` are not strictly increasing at docid {doc_id}")]
    UnorderedPostings { term: String, doc_id: DocId },

    #[error("docid {doc_id} appears twice while merging `{term}`")]
    DuplicateDocId { term: String, doc_id: DocId },

    #[error("terms out of order: `{previous}` followed by `{next}`")]
    UnsortedTerms { previous: String, next: String },

    #[error("offset {offset} points at `{found}`, expected `{expected}`")]
    OffsetMismatch { expected: String, found: String, offset: u64 },

    #[error("malformed offset entry: {0:?}")]
    MalformedOffset(String),

    #[error("malformed catalog entry: {0:?}")]
    MalformedCatalog(String),

    #[error("docid counter exhausted")]
    DocIdOverflow,

    #[error("docid {0} missing from the document catalog")]
    UnknownDocument(DocId),
}
