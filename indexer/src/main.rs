use anyhow::Result;
use clap::Parser;
use engine::chunk::DEFAULT_BATCH_SIZE;
use engine::persist::{save_meta, IndexPaths, MetaFile, FORMAT_VERSION};
use engine::pipeline::{build_index, BuildOptions};
use tracing_subscriber::{EnvFilter, fmt};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the tiered TF-IDF inverted index from a crawled corpus", long_about = None)]
struct Cli {
    /// Corpus directory; every file is one `{url, content}` JSON record
    #[arg(long, default_value = "DEV")]
    input: PathBuf,
    /// Directory receiving index.txt, offset.txt, docidmap.txt and chunks
    #[arg(long, default_value = ".")]
    output: PathBuf,
    /// Corpus files per in-memory batch (one chunk file per batch)
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    /// Delete chunk files and combined.txt after a successful build
    #[arg(long, default_value_t = false)]
    clean: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let opts = BuildOptions { input: cli.input, output: cli.output, batch_size: cli.batch_size, clean: cli.clean };
    let report = build_index(&opts)?;

    let meta = MetaFile {
        num_docs: report.documents,
        num_terms: report.terms,
        num_chunks: report.chunks,
        skipped_records: report.malformed,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
    };
    save_meta(&IndexPaths::new(&opts.output), &meta)?;

    tracing::info!(output = %opts.output.display(), docs = report.documents, terms = report.terms, "index build complete");
    Ok(())
}
