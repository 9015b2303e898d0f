use crate::chunk::IndexingSession;
use crate::compact::compact_file;
use crate::merge::merge_chunks;
use crate::offset::build_offset_file;
use crate::persist::IndexPaths;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub batch_size: usize,
    /// Remove chunk files and the merged intermediate once the index is written.
    pub clean: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: u32,
    pub duplicates: usize,
    pub malformed: usize,
    pub chunks: usize,
    pub terms: u64,
}

/// Run every indexing phase in order: chunking, k-way merge, compaction, offsets.
pub fn build_index(opts: &BuildOptions) -> Result<BuildReport> {
    if !opts.input.is_dir() {
        bail!("corpus directory {} does not exist", opts.input.display());
    }
    let paths = IndexPaths::new(&opts.output);
    fs::create_dir_all(&paths.root)?;
    let chunks_dir = paths.chunks_dir();
    if chunks_dir.exists() {
        fs::remove_dir_all(&chunks_dir).with_context(|| format!("clearing {}", chunks_dir.display()))?;
    }

    let mut session = IndexingSession::new(paths.clone(), opts.batch_size);
    session.index_corpus(&opts.input)?;
    let (catalog, chunks, stats) = session.finish()?;
    tracing::info!(docs = catalog.len(), chunks = chunks.len(), duplicates = stats.duplicates, malformed = stats.malformed, "indexed corpus");

    merge_chunks(&chunks, &paths.merged())?;
    let terms = compact_file(&paths.merged(), &paths.index())?;
    build_offset_file(&paths.index(), &paths.offsets())?;

    if opts.clean {
        fs::remove_file(paths.merged())?;
        if chunks_dir.exists() {
            fs::remove_dir_all(&chunks_dir)?;
        }
    }

    Ok(BuildReport {
        documents: stats.indexed,
        duplicates: stats.duplicates,
        malformed: stats.malformed,
        chunks: chunks.len(),
        terms,
    })
}
