//! Configuration loading.
//!
//! Merges defaults, `ragdb.toml` and `RAGDB_*` environment variables with
//! Figment, then validates the chunking parameters once at load time.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory scanned for source documents.
    pub data_dir: PathBuf,
    /// Directory holding the vector index.
    pub index_dir: PathBuf,
    /// Vector index table (collection) name.
    pub table: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Pending chunks are embedded and committed every this many chunks.
    pub commit_batch_size: usize,
    /// Fraction of the final hybrid score attributed to semantic similarity.
    pub hybrid_weight: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("docs"),
            index_dir: PathBuf::from("ragdb_data"),
            table: "documents".to_string(),
            chunk_size: 2000,
            chunk_overlap: 100,
            commit_batch_size: 500,
            hybrid_weight: 0.95,
        }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("ragdb.toml"))
            .merge(Env::prefixed("RAGDB_"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be at least 1");
        }
        if self.chunk_overlap >= self.chunk_size {
            anyhow::bail!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap,
                self.chunk_size
            );
        }
        if self.commit_batch_size == 0 {
            anyhow::bail!("commit_batch_size must be at least 1");
        }
        Ok(())
    }
}
