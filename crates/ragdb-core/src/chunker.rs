//! Word-boundary chunking with overlap.
//!
//! Splits raw text into overlapping spans that prefer to end on a space so
//! words are never cut in half, unless a single unbroken word is longer
//! than the chunk size. Offsets are char positions into the source text.

use crate::error::{Error, Result};
use crate::types::{Chunk, Document, Meta};

fn validate(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::InvalidParameter("chunk_size must be at least 1".into()));
    }
    if overlap >= chunk_size {
        return Err(Error::InvalidParameter(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Split `text` into overlapping chunks of roughly `chunk_size` chars.
///
/// Empty input yields an empty vec. Start positions strictly increase, so
/// chunking always terminates even when `overlap` swallows an entire
/// collapsed chunk.
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    validate(chunk_size, overlap)?;

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = (start + chunk_size).min(chars.len());

        // Prefer a word boundary: back up to the nearest space unless the
        // whole segment is one unbroken word.
        if end < chars.len() && !chars[end].is_whitespace() {
            if let Some(space) = (start..end).rev().find(|&i| chars[i] == ' ') {
                if space > start {
                    end = space;
                }
            }
        }

        let piece: String = chars[start..end].iter().collect();
        if !piece.trim().is_empty() {
            chunks.push(Chunk::new(piece, start, end, Meta::new())?);
        }

        // Forward progress: the next start must strictly exceed this one.
        let next_start = end.saturating_sub(overlap);
        start = if next_start <= start { start + 1 } else { next_start };
    }

    Ok(chunks)
}

/// Chunk `text` and wrap each chunk as a [`Document`].
///
/// Documents get ids of the form `{source}_{index}` and carry `source`,
/// `chunk_index` and `total_chunks` metadata so hits can be attributed
/// back to their origin.
pub fn process(text: &str, source: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Document>> {
    let chunks = chunk(text, chunk_size, overlap)?;
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let mut meta = Meta::new();
            meta.insert("source".to_string(), source.to_string());
            meta.insert("chunk_index".to_string(), i.to_string());
            meta.insert("total_chunks".to_string(), total.to_string());
            Document::new(format!("{source}_{i}"), c.text(), meta)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_chunk_size() {
        assert!(matches!(chunk("abc", 0, 0), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        assert!(matches!(chunk("abc", 10, 10), Err(Error::InvalidParameter(_))));
        assert!(matches!(chunk("abc", 10, 20), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn empty_text_is_not_an_error() {
        let chunks = chunk("", 100, 10).expect("chunk");
        assert!(chunks.is_empty());
    }

    #[test]
    fn unbroken_word_longer_than_chunk_size_still_terminates() {
        let word = "x".repeat(50);
        let chunks = chunk(&word, 10, 2).expect("chunk");
        assert!(!chunks.is_empty());
        // No space to back up to, so the word is cut at chunk_size.
        assert_eq!(chunks[0].text(), &word[..10]);
        assert!(chunks.iter().all(|c| c.len() <= 10));
    }
}
