use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Arrow schema for the documents table. Metadata is stored as a JSON
/// string column so arbitrary string maps round-trip without schema churn.
pub fn build_arrow_schema(dim: usize) -> Arc<Schema> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let dim = dim as i32;
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("metadata", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}
