use anyhow::Result;
use clap::Parser;
use engine::persist::{load_meta, IndexPaths};
use engine::QueryEngine;
use retriever::{run_session, DEFAULT_LIMIT};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "retriever")]
#[command(about = "Interactive search over a built index; type !q to quit")]
struct Args {
    /// Index directory path
    #[arg(long, default_value = ".")]
    index: String,
    /// Results shown per query
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let paths = IndexPaths::new(&args.index);
    match load_meta(&paths) {
        Ok(meta) => tracing::info!(docs = meta.num_docs, terms = meta.num_terms, created_at = %meta.created_at, "index metadata"),
        Err(err) => tracing::debug!(error = %err, "no index metadata"),
    }
    let engine = QueryEngine::open(&paths)?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_session(&engine, stdin.lock(), stdout.lock(), args.limit)
}
