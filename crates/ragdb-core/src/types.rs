//! Domain types shared by the ingest and search engines.
//!
//! All of these are value objects validated at construction; there is no
//! way to mutate one into an invalid state afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub type Meta = HashMap<String, String>;

/// A document held by the vector store.
///
/// `id` is unique within a collection. `embedding` is absent until the
/// pipeline attaches one; attaching produces a new value rather than
/// mutating the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    content: String,
    metadata: Meta,
    embedding: Option<Vec<f32>>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>, metadata: Meta) -> Result<Self> {
        let id = id.into();
        let content = content.into();
        if id.is_empty() {
            return Err(Error::InvalidParameter("document id cannot be empty".into()));
        }
        if content.is_empty() {
            return Err(Error::InvalidParameter(format!(
                "document {id} has empty content"
            )));
        }
        Ok(Self { id, content, metadata, embedding: None })
    }

    /// Returns a copy of this document carrying `embedding`.
    pub fn with_embedding(&self, embedding: Vec<f32>) -> Result<Self> {
        if embedding.is_empty() {
            return Err(Error::InvalidParameter(format!(
                "document {} given a zero-length embedding",
                self.id
            )));
        }
        let mut doc = self.clone();
        doc.embedding = Some(embedding);
        Ok(doc)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &Meta {
        &self.metadata
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }
}

/// A contiguous character span of a source text, sized for embedding.
///
/// Positions are char offsets into the source; the span is half-open
/// `[start_pos, end_pos)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    text: String,
    start_pos: usize,
    end_pos: usize,
    metadata: Meta,
}

impl Chunk {
    pub fn new(text: impl Into<String>, start_pos: usize, end_pos: usize, metadata: Meta) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::InvalidParameter("chunk text cannot be empty".into()));
        }
        if end_pos <= start_pos {
            return Err(Error::InvalidParameter(format!(
                "chunk end ({end_pos}) must be greater than start ({start_pos})"
            )));
        }
        Ok(Self { text, start_pos, end_pos, metadata })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start_pos(&self) -> usize {
        self.start_pos
    }

    pub fn end_pos(&self) -> usize {
        self.end_pos
    }

    pub fn metadata(&self) -> &Meta {
        &self.metadata
    }

    /// Span length in characters.
    pub fn len(&self) -> usize {
        self.end_pos - self.start_pos
    }

    /// Always false: the constructor rejects empty text and zero-length
    /// spans.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the half-open spans of the two chunks intersect.
    pub fn overlaps(&self, other: &Chunk) -> bool {
        !(self.end_pos <= other.start_pos || self.start_pos >= other.end_pos)
    }
}

/// A document paired with its relevance score and position in a result set.
///
/// Within any returned list, `rank` equals the list index and scores are
/// non-increasing by rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    document: Document,
    score: f32,
    rank: usize,
}

impl SearchResult {
    pub fn new(document: Document, score: f32, rank: usize) -> Result<Self> {
        if !(0.0..=1.0).contains(&score) {
            return Err(Error::InvalidParameter(format!(
                "score must be in [0.0, 1.0], got {score}"
            )));
        }
        Ok(Self { document, score, rank })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn rank(&self) -> usize {
        self.rank
    }
}

/// A query after expansion: the original text plus related terms.
///
/// `expanded` is ordered, duplicate-free and always starts with the
/// original query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTerms {
    original: String,
    expanded: Vec<String>,
}

impl QueryTerms {
    pub fn new(original: impl Into<String>, expanded: Vec<String>) -> Result<Self> {
        let original = original.into();
        if original.is_empty() {
            return Err(Error::EmptyQuery);
        }
        if expanded.is_empty() {
            return Err(Error::InvalidParameter("expanded terms cannot be empty".into()));
        }
        Ok(Self { original, expanded })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn expanded(&self) -> &[String] {
        &self.expanded
    }

    pub fn term_count(&self) -> usize {
        self.expanded.len()
    }
}

/// Which retrieval strategy `SearchEngine::search` dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Semantic,
    Bm25,
    Hybrid,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Semantic => write!(f, "semantic"),
            SearchMode::Bm25 => write!(f, "bm25"),
            SearchMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "semantic" => Ok(SearchMode::Semantic),
            "bm25" => Ok(SearchMode::Bm25),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(Error::InvalidParameter(format!("unknown search mode: {other}"))),
        }
    }
}
