//! A small observer seam for ingest counters, grounded in the same
//! atomic-counters-plus-span shape the blob store's own observer used,
//! minus the OTel exporter plumbing this crate has no use for.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::span::EnteredSpan;

/// Counters a run cares about reporting at the end: bytes and blob
/// counts by outcome, parity creation, and item errors encountered.
pub trait IngestObserver: Send + Sync {
    /// A file's bytes were newly stored as a blob.
    fn blob_ingested(&self, bytes: u64);
    /// A file's content was already present; no new blob was stored.
    fn blob_deduped(&self, bytes: u64);
    /// A parity set was created for a blob.
    fn parity_created(&self);
    /// A per-item error was logged and the item skipped.
    fn item_error(&self);
    /// Open a named span for the duration of one pipeline stage.
    fn span(&self, name: &'static str) -> IngestSpan {
        IngestSpan::new(name)
    }
}

/// RAII guard for a `tracing` span opened by [`IngestObserver::span`].
pub struct IngestSpan {
    _entered: EnteredSpan,
}

impl IngestSpan {
    fn new(name: &'static str) -> Self {
        let span = tracing::span!(tracing::Level::DEBUG, "ingest", stage = name);
        Self { _entered: span.entered() }
    }
}

/// In-process counters, suitable for a run's final summary line. No
/// external exporter; just atomics a caller can snapshot.
#[derive(Debug, Default)]
pub struct CountingObserver {
    ingested_bytes: AtomicU64,
    ingested_count: AtomicU64,
    deduped_bytes: AtomicU64,
    deduped_count: AtomicU64,
    parity_created_count: AtomicU64,
    item_error_count: AtomicU64,
}

/// Point-in-time snapshot of a [`CountingObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountingSnapshot {
    /// Bytes newly stored this run.
    pub ingested_bytes: u64,
    /// Number of files newly stored this run.
    pub ingested_count: u64,
    /// Bytes observed that deduped against an existing blob.
    pub deduped_bytes: u64,
    /// Number of files that deduped against an existing blob.
    pub deduped_count: u64,
    /// Parity sets created this run.
    pub parity_created_count: u64,
    /// Per-item errors logged and skipped.
    pub item_error_count: u64,
}

impl CountingObserver {
    /// Build a fresh, zeroed observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current counters without resetting them.
    #[must_use]
    pub fn snapshot(&self) -> CountingSnapshot {
        CountingSnapshot {
            ingested_bytes: self.ingested_bytes.load(Ordering::Relaxed),
            ingested_count: self.ingested_count.load(Ordering::Relaxed),
            deduped_bytes: self.deduped_bytes.load(Ordering::Relaxed),
            deduped_count: self.deduped_count.load(Ordering::Relaxed),
            parity_created_count: self.parity_created_count.load(Ordering::Relaxed),
            item_error_count: self.item_error_count.load(Ordering::Relaxed),
        }
    }
}

impl IngestObserver for CountingObserver {
    fn blob_ingested(&self, bytes: u64) {
        self.ingested_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.ingested_count.fetch_add(1, Ordering::Relaxed);
    }

    fn blob_deduped(&self, bytes: u64) {
        self.deduped_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.deduped_count.fetch_add(1, Ordering::Relaxed);
    }

    fn parity_created(&self) {
        self.parity_created_count.fetch_add(1, Ordering::Relaxed);
    }

    fn item_error(&self) {
        self.item_error_count.fetch_add(1, Ordering::Relaxed);
    }
}
