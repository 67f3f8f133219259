//! Process-level wiring for the ragdb binaries.
//!
//! Adapters are constructed exactly once, at startup, inside [`Registry`]
//! and passed down by reference. No module-level singletons, no lazy
//! first-use initialization.

use std::sync::Arc;

use ragdb_core::config::Settings;
use ragdb_embed::{default_embedder, Embedder};
use ragdb_ingest::{FileExtractor, IndexingPipeline, PipelineOptions};
use ragdb_search::SearchEngine;
use ragdb_vector::{LanceStore, VectorStore};

pub struct Registry {
    pub settings: Settings,
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn VectorStore>,
}

impl Registry {
    /// Build every adapter the process needs. Fails fast: a missing model
    /// or unreachable index surfaces here, not mid-run.
    pub fn open(settings: Settings) -> anyhow::Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::from(default_embedder()?);
        let store = LanceStore::connect(&settings.index_dir, &settings.table, embedder.dimensions())?;
        Ok(Self { settings, embedder, store: Arc::new(store) })
    }

    pub fn engine(&self) -> SearchEngine {
        SearchEngine::new(self.store.clone(), self.embedder.clone(), self.settings.hybrid_weight)
    }

    pub fn pipeline(&self) -> anyhow::Result<IndexingPipeline> {
        let options = PipelineOptions {
            chunk_size: self.settings.chunk_size,
            overlap: self.settings.chunk_overlap,
            commit_batch_size: self.settings.commit_batch_size,
        };
        Ok(IndexingPipeline::new(
            self.embedder.clone(),
            self.store.clone(),
            Arc::new(FileExtractor::new()),
            options,
        )?)
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
