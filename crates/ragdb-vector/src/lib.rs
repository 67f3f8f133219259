//! Vector store port and its implementations.
//!
//! [`LanceStore`] persists documents and embeddings in LanceDB;
//! [`MemoryStore`] is the in-memory implementation every test injects.
//! Both return similarity scores already normalized to [0, 1].

pub mod lance;
pub mod memory;
pub mod schema;

pub use lance::LanceStore;
pub use memory::MemoryStore;

use ragdb_core::error::Result;
use ragdb_core::types::{Document, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub document_count: usize,
}

/// Stores embedded documents and answers nearest-neighbor queries.
///
/// The index's internal search algorithm is opaque to callers; the only
/// contract is that `search` returns results in native relevance order
/// with scores in [0, 1].
pub trait VectorStore: Send + Sync {
    /// Add documents. Every document must carry an embedding; oversized
    /// batches are re-chunked to the index's own batch limit internally.
    fn add(&self, docs: &[Document]) -> Result<()>;

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    fn get_by_id(&self, id: &str) -> Result<Option<Document>>;

    /// Returns whether a document with `id` existed.
    fn delete(&self, id: &str) -> Result<bool>;

    fn stats(&self) -> Result<IndexStats>;

    fn clear(&self) -> Result<()>;
}

/// Convert a cosine distance in [0, 2] to a similarity score in [0, 1].
///
/// Applied at every point where the vector index is queried, so scores are
/// comparable across call sites.
pub fn distance_to_score(distance: f32) -> f32 {
    (1.0 - distance / 2.0).clamp(0.0, 1.0)
}
