use ragdb_core::types::{Document, Meta};
use ragdb_embed::{Embedder, HashEmbedder};
use ragdb_vector::{LanceStore, VectorStore};
use tempfile::TempDir;

const DIM: usize = 64;

fn embedded_doc(embedder: &HashEmbedder, id: &str, content: &str, source: &str) -> Document {
    let mut meta = Meta::new();
    meta.insert("source".to_string(), source.to_string());
    let doc = Document::new(id, content, meta).expect("doc");
    doc.with_embedding(embedder.embed(content).expect("embed")).expect("with_embedding")
}

fn open_store(tmp: &TempDir) -> LanceStore {
    LanceStore::connect(tmp.path(), "documents_test", DIM).expect("connect")
}

#[test]
fn full_flow_add_search_get_delete() {
    let tmp = TempDir::new().expect("tmp");
    let store = open_store(&tmp);
    let embedder = HashEmbedder::new(DIM);

    let docs = vec![
        embedded_doc(&embedder, "fire_0", "how to start a fire with flint and steel", "fire.md"),
        embedded_doc(&embedder, "water_0", "purifying water by boiling and filtration", "water.md"),
        embedded_doc(&embedder, "shelter_0", "building a lean-to shelter from branches", "shelter.md"),
    ];
    store.add(&docs).expect("add");
    assert_eq!(store.stats().expect("stats").document_count, 3);

    let query = embedder.embed("start a fire").expect("embed");
    let results = store.search(&query, 3).expect("search");
    assert!(!results.is_empty());
    for (i, r) in results.iter().enumerate() {
        assert_eq!(r.rank(), i);
        assert!((0.0..=1.0).contains(&r.score()), "score {} out of bounds", r.score());
        if i > 0 {
            assert!(results[i - 1].score() >= r.score());
        }
    }

    let fetched = store.get_by_id("water_0").expect("get").expect("present");
    assert_eq!(fetched.content(), "purifying water by boiling and filtration");
    assert_eq!(fetched.metadata()["source"], "water.md");

    assert!(store.get_by_id("nope").expect("get").is_none());

    assert!(store.delete("water_0").expect("delete"));
    assert!(!store.delete("water_0").expect("delete"));
    assert_eq!(store.stats().expect("stats").document_count, 2);

    store.clear().expect("clear");
    assert_eq!(store.stats().expect("stats").document_count, 0);
}

#[test]
fn search_before_any_write_returns_empty() {
    let tmp = TempDir::new().expect("tmp");
    let store = open_store(&tmp);
    let results = store.search(&vec![0.0; DIM], 5).expect("search");
    assert!(results.is_empty());
    assert_eq!(store.stats().expect("stats").document_count, 0);
}

#[test]
fn add_rejects_missing_and_mismatched_embeddings() {
    let tmp = TempDir::new().expect("tmp");
    let store = open_store(&tmp);

    let bare = Document::new("bare", "no embedding", Meta::new()).expect("doc");
    assert!(store.add(&[bare]).is_err());

    let wrong = Document::new("wrong", "wrong width", Meta::new())
        .expect("doc")
        .with_embedding(vec![0.5; DIM + 1])
        .expect("with_embedding");
    assert!(store.add(&[wrong]).is_err());
}
