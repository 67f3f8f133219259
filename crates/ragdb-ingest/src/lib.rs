//! Document ingestion: text extraction, source discovery and the
//! progressive-commit indexing pipeline.

pub mod extract;
pub mod pipeline;

pub use extract::{discover_sources, FileExtractor, TextExtractor};
pub use pipeline::{IndexSummary, IndexingPipeline, PipelineOptions};
