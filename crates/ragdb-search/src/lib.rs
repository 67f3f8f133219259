//! Hybrid search over a vector store.
//!
//! Dispatches a query to semantic search, keyword (term-overlap) search,
//! or a weighted fusion of both, with query expansion and a rerank pass.
//! The engine is stateless between calls; the only fixed state is the
//! hybrid weight and the static expansion table.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use ragdb_core::error::{Error, Result};
use ragdb_core::types::{Document, QueryTerms, SearchMode, SearchResult};
use ragdb_embed::Embedder;
use ragdb_vector::VectorStore;

/// Trigger term -> related terms. A trigger fires when it appears as a
/// substring of the lower-cased query.
const EXPANSIONS: &[(&str, &[&str])] = &[
    ("python", &["python", "py", "programming"]),
    ("ml", &["machine learning", "ml", "artificial intelligence"]),
    ("ai", &["artificial intelligence", "ai", "machine learning"]),
    ("api", &["api", "interface", "endpoint"]),
];

pub struct SearchEngine {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    hybrid_weight: f32,
}

impl SearchEngine {
    /// `hybrid_weight` is the fraction of the final hybrid score taken from
    /// semantic similarity; values outside [0, 1] are clamped.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, hybrid_weight: f32) -> Self {
        Self { store, embedder, hybrid_weight: hybrid_weight.clamp(0.0, 1.0) }
    }

    pub fn hybrid_weight(&self) -> f32 {
        self.hybrid_weight
    }

    /// Run a query in the given mode. An empty index yields an empty list,
    /// not an error; an empty query or zero limit is an error.
    pub fn search(&self, query: &str, mode: SearchMode, limit: usize) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        if limit == 0 {
            return Err(Error::InvalidParameter("limit must be positive".into()));
        }
        match mode {
            SearchMode::Semantic => self.semantic_search(query, limit),
            SearchMode::Bm25 => self.keyword_search(query, limit),
            SearchMode::Hybrid => self.hybrid_search(query, limit),
        }
    }

    fn semantic_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let t0 = Instant::now();
        let query_embedding = self.embedder.embed(query)?;
        let embed_ms = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        let results = self.store.search(&query_embedding, limit)?;
        let search_ms = t1.elapsed().as_secs_f64() * 1000.0;

        tracing::debug!(embed_ms, search_ms, results = results.len(), "semantic search");
        Ok(results)
    }

    /// Simplified keyword search: term frequency over document length,
    /// scored against semantic candidates. There is no independent
    /// inverted index, so keyword recall is bounded by semantic recall.
    fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let query_terms: Vec<String> =
            query.to_lowercase().split_whitespace().map(ToString::to_string).collect();

        if self.store.stats()?.document_count == 0 {
            return Ok(Vec::new());
        }

        // Pull a wider pool of semantic candidates, then rescore them by
        // keyword overlap.
        let candidates = self.semantic_search(query, limit * 2)?;

        let mut scored: Vec<(Document, f32)> = candidates
            .into_iter()
            .map(|result| {
                let doc = result.into_document();
                let score = keyword_score(&query_terms, &doc);
                (doc, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(rank, (doc, score))| SearchResult::new(doc, score.min(1.0), rank))
            .collect()
    }

    fn hybrid_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let t0 = Instant::now();

        let semantic_results = self.semantic_search(query, limit * 2)?;
        let keyword_results = self.keyword_search(query, limit * 2)?;
        let semantic_count = semantic_results.len();
        let keyword_count = keyword_results.len();

        // Union by document id; a document seen on only one side scores
        // 0.0 on the other.
        let mut by_id: HashMap<String, (Document, f32, f32)> = HashMap::new();
        for result in semantic_results {
            let score = result.score();
            let doc = result.into_document();
            by_id.insert(doc.id().to_string(), (doc, score, 0.0));
        }
        for result in keyword_results {
            let score = result.score();
            let doc = result.into_document();
            match by_id.entry(doc.id().to_string()) {
                Entry::Occupied(mut entry) => entry.get_mut().2 = score,
                Entry::Vacant(entry) => {
                    entry.insert((doc, 0.0, score));
                }
            }
        }

        let mut fused: Vec<(Document, f32)> = by_id
            .into_values()
            .map(|(doc, semantic, keyword)| {
                let score = self.hybrid_weight * semantic + (1.0 - self.hybrid_weight) * keyword;
                (doc, score)
            })
            .collect();
        fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let results: Result<Vec<SearchResult>> = fused
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(rank, (doc, score))| SearchResult::new(doc, score.clamp(0.0, 1.0), rank))
            .collect();
        let results = results?;

        let hybrid_ms = t0.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            hybrid_ms,
            semantic_count,
            keyword_count,
            final_count = results.len(),
            "hybrid search"
        );
        Ok(results)
    }

    /// Expand a query with related terms from the static table. No match
    /// means the expansion is just the original query.
    pub fn expand_query(&self, query: &str) -> Result<QueryTerms> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        let query_lower = query.to_lowercase();
        let mut expanded: Vec<String> = vec![query.to_string()];

        for (trigger, synonyms) in EXPANSIONS {
            if query_lower.contains(trigger) {
                expanded.extend(
                    synonyms.iter().filter(|s| **s != query_lower).map(ToString::to_string),
                );
            }
        }

        // De-duplicate, preserving first-seen order.
        let mut seen = std::collections::HashSet::new();
        expanded.retain(|term| seen.insert(term.clone()));

        QueryTerms::new(query, expanded)
    }

    /// Boost results whose content or metadata contains the literal query,
    /// then re-sort and re-rank.
    pub fn rerank(&self, query: &str, results: Vec<SearchResult>) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        let query_lower = query.to_lowercase();

        let mut boosted: Vec<(Document, f32)> = results
            .into_iter()
            .map(|result| {
                let score = result.score();
                let doc = result.into_document();
                let mut boost = 1.0f32;
                if doc.content().to_lowercase().contains(&query_lower) {
                    boost = 1.2;
                }
                if doc.metadata().values().any(|v| v.to_lowercase().contains(&query_lower)) {
                    boost *= 1.1;
                }
                (doc, (score * boost).min(1.0))
            })
            .collect();

        boosted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        boosted
            .into_iter()
            .enumerate()
            .map(|(rank, (doc, score))| SearchResult::new(doc, score, rank))
            .collect()
    }
}

/// Occurrences of each term in the content, normalized by content length.
fn keyword_score(terms: &[String], doc: &Document) -> f32 {
    let content_lower = doc.content().to_lowercase();
    let hits: usize = terms.iter().map(|t| content_lower.matches(t.as_str()).count()).sum();
    hits as f32 / doc.content().chars().count().max(1) as f32
}
