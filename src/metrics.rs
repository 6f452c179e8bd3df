use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct SummaryMetrics {
    documents_summarized: AtomicU64,
    documents_failed: AtomicU64,
    chunks_summarized: AtomicU64,
}

impl SummaryMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document whose report was assembled, with the number of chunks it took.
    pub fn record_document(&self, chunk_count: u64) {
        self.documents_summarized.fetch_add(1, Ordering::Relaxed);
        self.chunks_summarized
            .fetch_add(chunk_count, Ordering::Relaxed);
    }

    /// Record a document that failed at any pipeline stage.
    pub fn record_failure(&self) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_summarized: self.documents_summarized.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of summarization counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents with an assembled report since startup.
    pub documents_summarized: u64,
    /// Number of documents that failed since startup.
    pub documents_failed: u64,
    /// Total chunk count sent for generation across summarized documents.
    pub chunks_summarized: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_chunks() {
        let metrics = SummaryMetrics::new();
        metrics.record_document(2);
        metrics.record_document(3);
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 2);
        assert_eq!(snapshot.chunks_summarized, 5);
        assert_eq!(snapshot.documents_failed, 1);
    }

    #[test]
    fn snapshot_starts_empty() {
        let metrics = SummaryMetrics::new();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                documents_summarized: 0,
                documents_failed: 0,
                chunks_summarized: 0,
            }
        );
    }
}
