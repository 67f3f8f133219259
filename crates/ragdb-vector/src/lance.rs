//! LanceDB-backed vector store.
//!
//! The LanceDB client is async; the [`VectorStore`] trait is sync, so the
//! store owns a tokio runtime and blocks on its own calls. Raw `_distance`
//! values from the index are converted to scores at this boundary.

use std::path::Path;
use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, Table};

use ragdb_core::error::{Error, Result};
use ragdb_core::types::{Document, Meta, SearchResult};

use crate::schema::build_arrow_schema;
use crate::{distance_to_score, IndexStats, VectorStore};

/// LanceDB rejects very large single writes; bigger adds are split
/// transparently.
const LANCE_MAX_BATCH: usize = 5000;

pub struct LanceStore {
    db: Connection,
    table_name: String,
    dim: usize,
    rt: tokio::runtime::Runtime,
}

impl LanceStore {
    /// Open (or create) a database at `path`. Ready on return; no lazy
    /// connection setup later.
    pub fn connect(path: &Path, table_name: &str, dim: usize) -> Result<Self> {
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| Error::IndexConnection(format!("failed to start runtime: {e}")))?;
        let db = rt
            .block_on(connect(path.to_string_lossy().as_ref()).execute())
            .map_err(|e| Error::IndexConnection(e.to_string()))?;
        tracing::info!(path = %path.display(), table = table_name, "connected to LanceDB");
        Ok(Self { db, table_name: table_name.to_string(), dim, rt })
    }

    fn open_table(&self) -> Result<Option<Table>> {
        let names = self
            .rt
            .block_on(self.db.table_names().execute())
            .map_err(|e| Error::IndexConnection(e.to_string()))?;
        if !names.contains(&self.table_name) {
            return Ok(None);
        }
        let table = self
            .rt
            .block_on(self.db.open_table(&self.table_name).execute())
            .map_err(|e| Error::IndexConnection(e.to_string()))?;
        Ok(Some(table))
    }

    fn insert_batch(&self, docs: &[Document]) -> Result<()> {
        let record_batch = self.docs_to_record_batch(docs)?;
        let schema = record_batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
        let result = if self.open_table()?.is_some() {
            self.rt.block_on(async {
                self.db
                    .open_table(&self.table_name)
                    .execute()
                    .await?
                    .add(reader)
                    .execute()
                    .await
            })
        } else {
            self.rt
                .block_on(self.db.create_table(&self.table_name, reader).execute())
                .map(|_| ())
        };
        result.map_err(|e| Error::IndexWrite(e.to_string()))
    }

    fn docs_to_record_batch(&self, docs: &[Document]) -> Result<RecordBatch> {
        let schema = build_arrow_schema(self.dim);
        let mut ids = Vec::with_capacity(docs.len());
        let mut contents = Vec::with_capacity(docs.len());
        let mut metadatas = Vec::with_capacity(docs.len());
        let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(docs.len());
        for doc in docs {
            let embedding = doc.embedding().ok_or_else(|| {
                Error::InvalidParameter(format!("document {} is missing an embedding", doc.id()))
            })?;
            if embedding.len() != self.dim {
                return Err(Error::InvalidParameter(format!(
                    "document {} embedding has {} dimensions, table expects {}",
                    doc.id(),
                    embedding.len(),
                    self.dim
                )));
            }
            ids.push(doc.id().to_string());
            contents.push(doc.content().to_string());
            metadatas.push(
                serde_json::to_string(doc.metadata())
                    .map_err(|e| Error::IndexWrite(e.to_string()))?,
            );
            vectors.push(Some(embedding.iter().map(|&x| Some(x)).collect()));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let list_width = self.dim as i32;
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(contents)),
                Arc::new(StringArray::from(metadatas)),
                Arc::new(FixedSizeListArray::from_iter_primitive::<
                    arrow_array::types::Float32Type,
                    _,
                    _,
                >(vectors.into_iter(), list_width)),
            ],
        )
        .map_err(|e| Error::IndexWrite(e.to_string()))
    }

    fn collect_documents(&self, batch: &RecordBatch) -> Result<Vec<(Document, Option<f32>)>> {
        let ids = str_column(batch, "id")?;
        let contents = str_column(batch, "content")?;
        let metadatas = str_column(batch, "metadata")?;
        let distances = batch
            .column_by_name("_distance")
            .and_then(|c| c.as_any().downcast_ref::<Float32Array>().cloned());

        let mut out = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            let metadata: Meta = serde_json::from_str(metadatas.value(i))
                .map_err(|e| Error::IndexConnection(format!("corrupt metadata column: {e}")))?;
            let doc = Document::new(ids.value(i), contents.value(i), metadata)?;
            let distance = distances.as_ref().map(|d| d.value(i));
            out.push((doc, distance));
        }
        Ok(out)
    }
}

impl VectorStore for LanceStore {
    fn add(&self, docs: &[Document]) -> Result<()> {
        if docs.is_empty() {
            return Ok(());
        }
        for batch in docs.chunks(LANCE_MAX_BATCH) {
            self.insert_batch(batch)?;
        }
        tracing::debug!(count = docs.len(), table = %self.table_name, "added documents");
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if k < 1 {
            return Err(Error::InvalidParameter(format!("k must be positive, got {k}")));
        }
        let Some(table) = self.open_table()? else {
            return Ok(Vec::new());
        };
        let mut stream = self
            .rt
            .block_on(async { table.vector_search(query.to_vec())?.limit(k).execute().await })
            .map_err(|e| Error::IndexConnection(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(batch) = self
            .rt
            .block_on(stream.try_next())
            .map_err(|e| Error::IndexConnection(e.to_string()))?
        {
            for (doc, distance) in self.collect_documents(&batch)? {
                let score = distance.map_or(0.5, distance_to_score);
                let rank = results.len();
                results.push(SearchResult::new(doc, score, rank)?);
            }
        }
        Ok(results)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Document>> {
        let Some(table) = self.open_table()? else {
            return Ok(None);
        };
        let predicate = format!("id = '{}'", id.replace('\'', "''"));
        let mut stream = self
            .rt
            .block_on(async { table.query().only_if(predicate).limit(1).execute().await })
            .map_err(|e| Error::IndexConnection(e.to_string()))?;
        while let Some(batch) = self
            .rt
            .block_on(stream.try_next())
            .map_err(|e| Error::IndexConnection(e.to_string()))?
        {
            if let Some((doc, _)) = self.collect_documents(&batch)?.into_iter().next() {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        if self.get_by_id(id)?.is_none() {
            return Ok(false);
        }
        let Some(table) = self.open_table()? else {
            return Ok(false);
        };
        let predicate = format!("id = '{}'", id.replace('\'', "''"));
        self.rt
            .block_on(table.delete(&predicate))
            .map_err(|e| Error::IndexWrite(e.to_string()))?;
        Ok(true)
    }

    fn stats(&self) -> Result<IndexStats> {
        let Some(table) = self.open_table()? else {
            return Ok(IndexStats { document_count: 0 });
        };
        let count = self
            .rt
            .block_on(table.count_rows(None))
            .map_err(|e| Error::IndexConnection(e.to_string()))?;
        Ok(IndexStats { document_count: count })
    }

    fn clear(&self) -> Result<()> {
        if self.open_table()?.is_none() {
            return Ok(());
        }
        self.rt
            .block_on(self.db.drop_table(&self.table_name))
            .map_err(|e| Error::IndexWrite(e.to_string()))?;
        Ok(())
    }
}

fn str_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::IndexConnection(format!("missing column: {name}")))
}
