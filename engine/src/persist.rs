use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u64,
    pub num_chunks: usize,
    pub skipped_records: usize,
    pub created_at: String,
    pub version: u32,
}

/// Fixed file-name conventions under one output root.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn chunks_dir(&self) -> PathBuf { self.root.join("Chunks") }
    pub fn chunk(&self, seq: usize) -> PathBuf { self.chunks_dir().join(format!("chunk_{seq:05}.txt")) }
    pub fn merged(&self) -> PathBuf { self.root.join("combined.txt") }
    pub fn index(&self) -> PathBuf { self.root.join("index.txt") }
    pub fn offsets(&self) -> PathBuf { self.root.join("offset.txt") }
    pub fn catalog(&self) -> PathBuf { self.root.join("docidmap.txt") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta()).with_context(|| format!("creating {}", paths.meta().display()))?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("opening {}", paths.meta().display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}
