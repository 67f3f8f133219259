use std::sync::Arc;

use ragdb_core::types::{Document, Meta};
use ragdb_embed::{Embedder, HashEmbedder};
use ragdb_vector::{MemoryStore, VectorStore};

const DIM: usize = 64;

fn embedded_doc(embedder: &HashEmbedder, id: &str, content: &str) -> Document {
    let doc = Document::new(id, content, Meta::new()).expect("doc");
    let vector = embedder.embed(content).expect("embed");
    doc.with_embedding(vector).expect("with_embedding")
}

#[test]
fn add_rejects_documents_without_embeddings() {
    let store = MemoryStore::new();
    let doc = Document::new("id", "content", Meta::new()).expect("doc");
    assert!(store.add(&[doc]).is_err());
}

#[test]
fn readding_an_id_replaces_the_document() {
    let embedder = HashEmbedder::new(DIM);
    let store = MemoryStore::new();
    store.add(&[embedded_doc(&embedder, "x", "first version")]).expect("add");
    store.add(&[embedded_doc(&embedder, "x", "second version")]).expect("add");
    assert_eq!(store.stats().expect("stats").document_count, 1);
    let stored = store.get_by_id("x").expect("get").expect("present");
    assert_eq!(stored.content(), "second version");
}

#[test]
fn search_is_sorted_bounded_and_ranked() {
    let embedder = HashEmbedder::new(DIM);
    let store = Arc::new(MemoryStore::new());
    let docs: Vec<Document> = [
        ("a", "apples and oranges at the market"),
        ("b", "thermodynamics of steam engines"),
        ("c", "fresh apples picked this morning"),
    ]
    .iter()
    .map(|(id, text)| embedded_doc(&embedder, id, text))
    .collect();
    store.add(&docs).expect("add");

    let query = embedder.embed("apples").expect("embed");
    let results = store.search(&query, 3).expect("search");
    assert_eq!(results.len(), 3);
    for (i, r) in results.iter().enumerate() {
        assert_eq!(r.rank(), i);
        assert!((0.0..=1.0).contains(&r.score()));
        if i > 0 {
            assert!(results[i - 1].score() >= r.score());
        }
    }
}

#[test]
fn search_empty_store_returns_empty() {
    let store = MemoryStore::new();
    let results = store.search(&vec![0.1; DIM], 5).expect("search");
    assert!(results.is_empty());
}

#[test]
fn search_rejects_zero_k() {
    let store = MemoryStore::new();
    assert!(store.search(&vec![0.1; DIM], 0).is_err());
}

#[test]
fn delete_and_clear() {
    let embedder = HashEmbedder::new(DIM);
    let store = MemoryStore::new();
    store
        .add(&[embedded_doc(&embedder, "a", "one"), embedded_doc(&embedder, "b", "two")])
        .expect("add");

    assert!(store.delete("a").expect("delete"));
    assert!(!store.delete("a").expect("delete"), "second delete is a no-op");
    assert_eq!(store.stats().expect("stats").document_count, 1);

    store.clear().expect("clear");
    assert_eq!(store.stats().expect("stats").document_count, 0);
}
