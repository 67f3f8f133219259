use thiserror::Error;

/// Failure taxonomy shared by every engine in the workspace.
///
/// Per-document variants (`Extraction`, `UnsupportedFormat`) are recorded
/// by the indexing pipeline and never abort a run. Per-batch variants
/// (`Embedding`, `IndexWrite`) lose one commit flush. `IndexConnection`
/// is fatal to the current run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("query cannot be empty")]
    EmptyQuery,

    #[error("failed to extract text from {file}: {reason}")]
    Extraction { file: String, reason: String },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("index write failed: {0}")]
    IndexWrite(String),

    #[error("index connection failed: {0}")]
    IndexConnection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
