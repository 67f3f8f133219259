//! In-memory vector store.
//!
//! Brute-force cosine scan over a HashMap. Not fast, just correct; this is
//! the implementation tests inject so nothing touches disk.

use std::collections::HashMap;
use std::sync::Mutex;

use ragdb_core::error::{Error, Result};
use ragdb_core::types::{Document, SearchResult};

use crate::{IndexStats, VectorStore};

#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Document>>> {
        self.documents
            .lock()
            .map_err(|_| Error::IndexWrite("memory store mutex poisoned".into()))
    }
}

impl VectorStore for MemoryStore {
    fn add(&self, docs: &[Document]) -> Result<()> {
        let mut map = self.lock()?;
        for doc in docs {
            if doc.embedding().is_none() {
                return Err(Error::InvalidParameter(format!(
                    "document {} is missing an embedding",
                    doc.id()
                )));
            }
            // Re-adding an id replaces the stored document.
            map.insert(doc.id().to_string(), doc.clone());
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if k < 1 {
            return Err(Error::InvalidParameter(format!("k must be positive, got {k}")));
        }
        let map = self.lock()?;
        if map.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(Document, f32)> = Vec::with_capacity(map.len());
        for doc in map.values() {
            let Some(embedding) = doc.embedding() else { continue };
            let score = cosine_score(query, embedding)?;
            scored.push((doc.clone(), score));
        }
        drop(map);

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .enumerate()
            .map(|(rank, (doc, score))| SearchResult::new(doc, score, rank))
            .collect()
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.lock()?.remove(id).is_some())
    }

    fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats { document_count: self.lock()?.len() })
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Cosine similarity mapped from [-1, 1] to [0, 1].
fn cosine_score(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::InvalidParameter(format!(
            "vector dimensions must match: {} != {}",
            a.len(),
            b.len()
        )));
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return Ok(0.0);
    }
    let similarity = dot / (mag_a * mag_b);
    Ok(((similarity + 1.0) / 2.0).clamp(0.0, 1.0))
}
