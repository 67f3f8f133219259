use std::collections::HashMap;

use ragdb_core::chunker;
use ragdb_core::error::Error;
use ragdb_core::progress::ProgressTracker;
use ragdb_core::types::{Chunk, Document, Meta, QueryTerms, SearchResult};

#[test]
fn chunks_cover_all_non_whitespace_content() {
    let text = "The quick brown fox jumps over the lazy dog. \
                Pack my box with five dozen liquor jugs. \
                How vexingly quick daft zebras jump!";
    let chunks = chunker::chunk(text, 40, 10).expect("chunk");

    assert!(!chunks.is_empty());
    let chars: Vec<char> = text.chars().collect();
    let mut covered = vec![false; chars.len()];
    for c in &chunks {
        assert!(!c.text().is_empty());
        assert!(c.len() <= 2 * 40, "chunk length bounded");
        for flag in &mut covered[c.start_pos()..c.end_pos()] {
            *flag = true;
        }
    }
    for (i, ch) in chars.iter().enumerate() {
        if !ch.is_whitespace() {
            assert!(covered[i], "char {i} ({ch:?}) not covered by any chunk");
        }
    }
}

#[test]
fn chunk_texts_match_their_offsets() {
    let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliet";
    let chars: Vec<char> = text.chars().collect();
    for c in chunker::chunk(text, 20, 5).expect("chunk") {
        let expected: String = chars[c.start_pos()..c.end_pos()].iter().collect();
        assert_eq!(c.text(), expected);
    }
}

#[test]
fn word_boundaries_are_respected() {
    let text = "one two three four five six seven eight nine ten eleven twelve";
    let chunks = chunker::chunk(text, 25, 0).expect("chunk");
    for c in &chunks {
        // A chunk never ends mid-word: the char after its end (if any)
        // is whitespace, or the chunk itself ends the text.
        let after: Option<char> = text.chars().nth(c.end_pos());
        if let Some(ch) = after {
            assert!(
                ch.is_whitespace() || c.text().ends_with(' '),
                "chunk {:?} ends mid-word before {ch:?}",
                c.text()
            );
        }
    }
}

#[test]
fn zero_overlap_produces_disjoint_spans() {
    let text = "word ".repeat(500);
    let chunks = chunker::chunk(&text, 200, 0).expect("chunk");
    assert!(chunks.len() > 1);
    for pair in chunks.windows(2) {
        assert!(
            pair[0].end_pos() <= pair[1].start_pos(),
            "spans overlap despite overlap=0"
        );
    }
}

#[test]
fn overlapping_chunks_intersect() {
    let text = "word ".repeat(500);
    let chunks = chunker::chunk(&text, 200, 50).expect("chunk");
    assert!(chunks.len() > 1);
    for pair in chunks.windows(2) {
        assert!(pair[0].overlaps(&pair[1]), "adjacent chunks should overlap");
    }
}

#[test]
fn process_wraps_chunks_as_documents() {
    let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do";
    let docs = chunker::process(text, "notes.md", 30, 5).expect("process");
    assert!(!docs.is_empty());
    let total = docs.len().to_string();
    for (i, doc) in docs.iter().enumerate() {
        assert_eq!(doc.id(), format!("notes.md_{i}"));
        assert_eq!(doc.metadata()["source"], "notes.md");
        assert_eq!(doc.metadata()["chunk_index"], i.to_string());
        assert_eq!(doc.metadata()["total_chunks"], total);
        assert!(doc.embedding().is_none());
    }
}

#[test]
fn document_validation() {
    assert!(Document::new("", "content", Meta::new()).is_err());
    assert!(Document::new("id", "", Meta::new()).is_err());

    let doc = Document::new("id", "content", Meta::new()).expect("doc");
    assert!(doc.with_embedding(vec![]).is_err());

    let embedded = doc.with_embedding(vec![0.1, 0.2]).expect("embedded");
    assert_eq!(embedded.embedding(), Some(&[0.1, 0.2][..]));
    // Attaching an embedding yields a distinct value; the original is untouched.
    assert!(doc.embedding().is_none());
}

#[test]
fn chunk_validation() {
    assert!(Chunk::new("", 0, 1, Meta::new()).is_err());
    assert!(Chunk::new("x", 5, 5, Meta::new()).is_err());
    assert!(Chunk::new("x", 5, 4, Meta::new()).is_err());

    let c = Chunk::new("hello", 10, 15, Meta::new()).expect("chunk");
    assert_eq!(c.len(), 5);
    assert!(!c.is_empty(), "a constructed chunk is never empty");
}

#[test]
fn search_result_rejects_out_of_range_scores() {
    let doc = Document::new("id", "content", Meta::new()).expect("doc");
    assert!(SearchResult::new(doc.clone(), -0.1, 0).is_err());
    assert!(SearchResult::new(doc.clone(), 1.1, 0).is_err());
    assert!(SearchResult::new(doc, 1.0, 0).is_ok());
}

#[test]
fn query_terms_validation() {
    assert!(matches!(QueryTerms::new("", vec!["a".into()]), Err(Error::EmptyQuery)));
    assert!(QueryTerms::new("q", vec![]).is_err());
    let terms = QueryTerms::new("q", vec!["q".into(), "query".into()]).expect("terms");
    assert_eq!(terms.term_count(), 2);
}

#[test]
fn tracker_counts_and_completion() {
    let mut tracker = ProgressTracker::new(3);
    assert!(!tracker.is_complete());

    tracker.mark_processed("a.md");
    tracker.mark_processed("b.md");
    tracker.mark_failed("c.md", "corrupt file");
    tracker.finish();

    assert_eq!(tracker.processed_documents(), 3);
    assert_eq!(tracker.failed_documents(), 1);
    assert_eq!(tracker.success_count(), 2);
    assert!(tracker.is_complete());
    assert_eq!(tracker.current_document(), "c.md");
    assert_eq!(
        tracker.failed_files(),
        &[("c.md".to_string(), "corrupt file".to_string())]
    );
}

#[test]
fn tracker_throughput_is_zero_before_clock_moves() {
    let tracker = ProgressTracker::new(10);
    // A freshly created tracker has effectively no elapsed time.
    assert!(tracker.docs_per_minute() == 0.0 || tracker.elapsed_seconds() >= 0.001);
}

#[test]
fn document_metadata_is_order_insensitive() {
    let mut m1 = HashMap::new();
    m1.insert("a".to_string(), "1".to_string());
    m1.insert("b".to_string(), "2".to_string());
    let mut m2 = HashMap::new();
    m2.insert("b".to_string(), "2".to_string());
    m2.insert("a".to_string(), "1".to_string());
    let d1 = Document::new("id", "content", m1).expect("doc");
    let d2 = Document::new("id", "content", m2).expect("doc");
    assert_eq!(d1, d2);
}
