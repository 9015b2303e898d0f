use anyhow::Result;
use engine::{DocId, QueryEngine};
use std::io::{BufRead, Write};
use std::time::Instant;

pub const DEFAULT_LIMIT: usize = 5;
pub const QUIT: &str = "!q";
pub const PROMPT: &str = "Enter your query: ";
pub const NOT_SEARCHABLE: &str = "Query is not searchable. Try another query.";

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<SearchHit>,
}

/// Rank `query` and resolve every hit's url through the catalog.
pub fn search(engine: &QueryEngine, query: &str, k: usize) -> Result<SearchResponse> {
    let start = Instant::now();
    let ranked = engine.search(query, k)?;
    let results = ranked
        .into_iter()
        .filter_map(|hit| {
            let url = engine.catalog().url(hit.doc_id)?.to_string();
            Some(SearchHit { doc_id: hit.doc_id, score: hit.score, url })
        })
        .collect();
    Ok(SearchResponse { query: query.to_string(), took_s: start.elapsed().as_secs_f64(), results })
}

/// Read queries line by line until `!q` or end of input, printing ranked urls for each.
pub fn run_session<R: BufRead, W: Write>(engine: &QueryEngine, mut input: R, mut out: W, limit: usize) -> Result<()> {
    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim_end_matches(['\r', '\n']);
        if query == QUIT {
            break;
        }
        let response = search(engine, query, limit)?;
        tracing::debug!(query = %response.query, hits = response.results.len(), took_s = response.took_s, "query answered");
        if response.results.is_empty() {
            writeln!(out, "{NOT_SEARCHABLE}")?;
            continue;
        }
        writeln!(out, "--- {} seconds ---", response.took_s)?;
        for hit in &response.results {
            writeln!(out, "{} {}", hit.url, hit.score)?;
        }
    }
    Ok(())
}
