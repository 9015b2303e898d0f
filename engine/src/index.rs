use crate::error::IndexError;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

pub type DocId = u32;

/// Structural prominence of a term inside one document. Higher wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    #[default]
    Plain = 1,
    Bold = 2,
    H3 = 3,
    H2 = 4,
    H1 = 5,
    Title = 6,
}

impl Tier {
    pub const MAX: u8 = 6;

    pub fn value(self) -> u8 { self as u8 }

    pub fn from_value(value: u8) -> Result<Self, IndexError> {
        match value {
            1 => Ok(Tier::Plain),
            2 => Ok(Tier::Bold),
            3 => Ok(Tier::H3),
            4 => Ok(Tier::H2),
            5 => Ok(Tier::H1),
            6 => Ok(Tier::Title),
            other => Err(IndexError::InvalidTier(other)),
        }
    }
}

/// One occurrence record in a term's posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32, // raw occurrence count in the document
    pub tier: Tier,
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.doc_id, self.tf, self.tier.value())
    }
}

impl FromStr for Posting {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || IndexError::MalformedPosting(s.to_string());
        let mut parts = s.split('-');
        let (Some(doc), Some(tf), Some(tier), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let doc_id = doc.parse().map_err(|_| malformed())?;
        let tf = tf.parse().map_err(|_| malformed())?;
        let tier = Tier::from_value(tier.parse().map_err(|_| malformed())?)?;
        Ok(Posting { doc_id, tf, tier })
    }
}

/// A parsed `term docid-tf-tier ...` line, shared by chunk files and the compacted index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingLine {
    pub term: String,
    pub postings: Vec<Posting>, // strictly increasing doc_id
}

impl PostingLine {
    pub fn parse(line: &str) -> Result<Self, IndexError> {
        let mut fields = line.split_whitespace();
        let term = fields.next().ok_or_else(|| IndexError::MalformedLine(line.to_string()))?;
        let postings = fields.map(str::parse).collect::<Result<Vec<Posting>, _>>()?;
        if postings.is_empty() {
            return Err(IndexError::MalformedLine(line.to_string()));
        }
        if let Some(w) = postings.windows(2).find(|w| w[0].doc_id >= w[1].doc_id) {
            return Err(IndexError::UnorderedPostings { term: term.to_string(), doc_id: w[1].doc_id });
        }
        Ok(PostingLine { term: term.to_string(), postings })
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_line(w, &self.term, &self.postings)
    }
}

/// Leading term of a line, without parsing its postings.
pub fn leading_term(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

pub fn write_line<W: Write>(w: &mut W, term: &str, postings: &[Posting]) -> io::Result<()> {
    w.write_all(term.as_bytes())?;
    for p in postings {
        write!(w, " {p}")?;
    }
    w.write_all(b"\n")
}

/// Two-way merge of docid-sorted lists. Both sides must be disjoint in docid.
pub fn merge_postings(term: &str, left: Vec<Posting>, right: Vec<Posting>) -> Result<Vec<Posting>, IndexError> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut l = left.into_iter().peekable();
    let mut r = right.into_iter().peekable();
    loop {
        let next = match (l.peek(), r.peek()) {
            (Some(a), Some(b)) if a.doc_id == b.doc_id => {
                return Err(IndexError::DuplicateDocId { term: term.to_string(), doc_id: a.doc_id });
            }
            (Some(a), Some(b)) if a.doc_id < b.doc_id => l.next(),
            (Some(_), Some(_)) => r.next(),
            (Some(_), None) => l.next(),
            (None, Some(_)) => r.next(),
            (None, None) => break,
        };
        out.extend(next);
    }
    Ok(out)
}
