//! Indexing pipeline: chunk, embed in batches, commit progressively.
//!
//! One bad document never aborts a run; a failed commit flush loses only
//! its own chunks. Only a connection-level index failure is fatal, since
//! continuing past one would silently lose every following batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use ragdb_core::chunker;
use ragdb_core::error::{Error, Result};
use ragdb_core::progress::ProgressTracker;
use ragdb_core::types::Document;
use ragdb_embed::Embedder;
use ragdb_vector::VectorStore;

use crate::extract::TextExtractor;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub chunk_size: usize,
    pub overlap: usize,
    /// Pending chunks are embedded and committed whenever this many have
    /// accumulated. Bounds peak memory and keeps single index calls short
    /// enough to avoid timeouts on large corpora.
    pub commit_batch_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { chunk_size: 2000, overlap: 100, commit_batch_size: 500 }
    }
}

/// Outcome of one indexing run. `chunks_committed` can lag
/// `chunks_generated` when a commit flush failed; the difference is the
/// observable data loss.
#[derive(Debug, Clone)]
pub struct IndexSummary {
    pub total_documents: usize,
    pub processed_documents: usize,
    pub failed_documents: usize,
    pub failed_files: Vec<(String, String)>,
    pub chunks_generated: usize,
    pub chunks_committed: usize,
    pub elapsed_seconds: f64,
    pub docs_per_minute: f64,
}

pub struct IndexingPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    extractor: Arc<dyn TextExtractor>,
    options: PipelineOptions,
}

impl IndexingPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        extractor: Arc<dyn TextExtractor>,
        options: PipelineOptions,
    ) -> Result<Self> {
        if options.commit_batch_size == 0 {
            return Err(Error::InvalidParameter("commit_batch_size must be at least 1".into()));
        }
        if options.chunk_size == 0 {
            return Err(Error::InvalidParameter("chunk_size must be at least 1".into()));
        }
        if options.overlap >= options.chunk_size {
            return Err(Error::InvalidParameter(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                options.overlap, options.chunk_size
            )));
        }
        Ok(Self { embedder, store, extractor, options })
    }

    /// Index `sources` in order, committing embedded chunks every
    /// `commit_batch_size`.
    pub fn run(&self, sources: &[PathBuf]) -> Result<IndexSummary> {
        let mut tracker = ProgressTracker::new(sources.len());
        let mut pending: Vec<Document> = Vec::new();
        let mut chunks_generated = 0usize;
        let mut chunks_committed = 0usize;

        let pb = ProgressBar::new(sources.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg}")
                .map(|s| s.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for path in sources {
            let name = source_name(path);
            pb.set_message(name.clone());
            match self.process_source(path) {
                Ok(docs) => {
                    chunks_generated += docs.len();
                    pending.extend(docs);
                    tracker.mark_processed(&name);
                }
                Err(err) => {
                    tracing::warn!(file = %name, error = %err, "skipping document");
                    tracker.mark_failed(&name, &err.to_string());
                }
            }
            pb.inc(1);

            if pending.len() >= self.options.commit_batch_size {
                chunks_committed += self.flush(&mut pending)?;
            }
        }

        if !pending.is_empty() {
            chunks_committed += self.flush(&mut pending)?;
        }
        pb.finish_with_message("done");

        tracker.finish();
        let summary = IndexSummary {
            total_documents: tracker.total_documents(),
            processed_documents: tracker.processed_documents(),
            failed_documents: tracker.failed_documents(),
            failed_files: tracker.failed_files().to_vec(),
            chunks_generated,
            chunks_committed,
            elapsed_seconds: tracker.elapsed_seconds(),
            docs_per_minute: tracker.docs_per_minute(),
        };
        tracing::info!(
            processed = summary.processed_documents,
            failed = summary.failed_documents,
            committed = summary.chunks_committed,
            generated = summary.chunks_generated,
            "indexing run finished"
        );
        Ok(summary)
    }

    fn process_source(&self, path: &Path) -> Result<Vec<Document>> {
        let text = self.extractor.extract_text(path)?;
        let name = source_name(path);
        chunker::process(&text, &name, self.options.chunk_size, self.options.overlap)
    }

    /// Embed and commit the pending buffer as one batch.
    ///
    /// Embedding or write failures lose this flush and nothing else;
    /// a connection failure aborts the run.
    fn flush(&self, pending: &mut Vec<Document>) -> Result<usize> {
        if pending.is_empty() {
            return Ok(0);
        }
        let batch = std::mem::take(pending);
        tracing::debug!(chunks = batch.len(), "embedding batch");

        let texts: Vec<String> = batch.iter().map(|d| d.content().to_string()).collect();
        let embeddings = match self.embedder.embed_batch(&texts) {
            Ok(embeddings) => embeddings,
            Err(err) => {
                tracing::warn!(chunks = batch.len(), error = %err, "batch embedding failed, flush lost");
                return Ok(0);
            }
        };

        let embedded: Result<Vec<Document>> = batch
            .iter()
            .zip(embeddings)
            .map(|(doc, vector)| doc.with_embedding(vector))
            .collect();
        let embedded = match embedded {
            Ok(docs) => docs,
            Err(err) => {
                tracing::warn!(chunks = batch.len(), error = %err, "embedding attach failed, flush lost");
                return Ok(0);
            }
        };

        match self.store.add(&embedded) {
            Ok(()) => Ok(embedded.len()),
            Err(Error::IndexConnection(reason)) => Err(Error::IndexConnection(reason)),
            Err(err) => {
                tracing::warn!(chunks = embedded.len(), error = %err, "batch commit failed, flush lost");
                Ok(0)
            }
        }
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string())
}
