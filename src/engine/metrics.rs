use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    documents_ingested: AtomicU64,
    queries: AtomicU64,
    degraded_queries: AtomicU64,
    index_reloads: AtomicU64,
    skipped_vectors: AtomicU64,
    selection_changes: AtomicU64,
}

impl Metrics {
    pub fn inc_ingested(&self) {
        self.documents_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_queries(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_degraded(&self) {
        self.degraded_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reload(&self, skipped: usize) {
        self.index_reloads.fetch_add(1, Ordering::Relaxed);
        self.skipped_vectors
            .fetch_add(skipped as u64, Ordering::Relaxed);
    }

    pub fn inc_selection_changes(&self) {
        self.selection_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    pub fn degraded_queries(&self) -> u64 {
        self.degraded_queries.load(Ordering::Relaxed)
    }

    pub fn index_reloads(&self) -> u64 {
        self.index_reloads.load(Ordering::Relaxed)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in [
            ("docqa_documents_ingested_total", &self.documents_ingested),
            ("docqa_queries_total", &self.queries),
            ("docqa_degraded_queries_total", &self.degraded_queries),
            ("docqa_index_reloads_total", &self.index_reloads),
            ("docqa_skipped_vectors_total", &self.skipped_vectors),
            ("docqa_selection_changes_total", &self.selection_changes),
        ] {
            let _ = writeln!(out, "# TYPE {name} counter");
            let _ = writeln!(out, "{name} {}", value.load(Ordering::Relaxed));
        }
        out
    }
}
