//! Mutable progress state for a running indexing job.

use std::time::Instant;

/// Counters for one indexing run.
///
/// Mutable by design: the pipeline driving the run is the only writer.
/// `mark_failed` counts the document as both processed and failed, so
/// `success_count` is `processed - failed` and completion is reached when
/// every source has been attempted.
#[derive(Debug)]
pub struct ProgressTracker {
    total_documents: usize,
    processed_documents: usize,
    failed_documents: usize,
    failed_files: Vec<(String, String)>,
    current_document: String,
    start_time: Instant,
    end_time: Option<Instant>,
}

impl ProgressTracker {
    pub fn new(total_documents: usize) -> Self {
        Self {
            total_documents,
            processed_documents: 0,
            failed_documents: 0,
            failed_files: Vec::new(),
            current_document: String::new(),
            start_time: Instant::now(),
            end_time: None,
        }
    }

    pub fn mark_processed(&mut self, filename: &str) {
        self.processed_documents += 1;
        self.current_document = filename.to_string();
    }

    pub fn mark_failed(&mut self, filename: &str, error: &str) {
        self.processed_documents += 1;
        self.failed_documents += 1;
        self.failed_files.push((filename.to_string(), error.to_string()));
        self.current_document = filename.to_string();
    }

    /// Freezes the elapsed clock. Call once, when the run ends.
    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    pub fn processed_documents(&self) -> usize {
        self.processed_documents
    }

    pub fn failed_documents(&self) -> usize {
        self.failed_documents
    }

    pub fn failed_files(&self) -> &[(String, String)] {
        &self.failed_files
    }

    pub fn current_document(&self) -> &str {
        &self.current_document
    }

    pub fn is_complete(&self) -> bool {
        self.processed_documents + self.failed_documents >= self.total_documents
    }

    pub fn success_count(&self) -> usize {
        self.processed_documents - self.failed_documents
    }

    pub fn elapsed_seconds(&self) -> f64 {
        let end = self.end_time.unwrap_or_else(Instant::now);
        end.duration_since(self.start_time).as_secs_f64()
    }

    /// Throughput over the run so far; 0.0 before the clock has moved.
    pub fn docs_per_minute(&self) -> f64 {
        let elapsed = self.elapsed_seconds();
        if elapsed < 0.001 {
            return 0.0;
        }
        (self.processed_documents as f64 / elapsed) * 60.0
    }
}
