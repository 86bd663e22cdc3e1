use docqa::config::Config;
use docqa::embedding::HashEmbedder;
use docqa::engine::{
    Engine, EngineError, SelectionError, ALL_DOCUMENTS, NO_RELEVANT_DOCUMENTS, RETRIEVAL_FAILED,
    SELECTED_DOCUMENTS,
};
use docqa::store::{DocumentId, DocumentStore, MemoryDocumentStore, StoreError, StoredDocument};
use docqa::vector::{codec, VectorError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const DIM: usize = 4;

fn config(reindex_on_ingest: bool) -> Config {
    Config {
        dimension: DIM,
        reindex_on_ingest,
        ..Config::default()
    }
}

fn engine_with(config: Config, store: Arc<dyn DocumentStore>) -> Engine {
    Engine::with_parts(config, store, Arc::new(HashEmbedder::new(DIM))).unwrap()
}

fn corpus() -> Vec<(&'static str, Vec<f32>)> {
    vec![
        ("doc one", vec![1.0, 0.0, 0.0, 0.0]),
        ("doc two", vec![0.0, 1.0, 0.0, 0.0]),
        ("doc three", vec![0.0, 0.0, 1.0, 0.0]),
        ("doc four", vec![0.0, 0.0, 0.0, 1.0]),
        ("doc five", vec![1.0, 1.0, 1.0, 1.0]),
    ]
}

/// Engine holding documents 1..=5. Nearest to `near_three()` in rank order:
/// 3, 4, 1, 2, 5.
fn seeded(reindex_on_ingest: bool) -> Engine {
    let engine = engine_with(config(reindex_on_ingest), Arc::new(MemoryDocumentStore::new()));
    for (expected, (text, vector)) in (1..).zip(corpus()) {
        let id = engine.ingest(text, vector).unwrap();
        assert_eq!(id, expected);
    }
    engine
}

fn near_three() -> Vec<f32> {
    vec![0.0, 0.0, 0.9, 0.1]
}

#[test]
fn nearest_document_without_selection() {
    let engine = seeded(true);
    let result = engine.answer_query(&near_three(), 1, 0.0);
    assert_eq!(result.ids(), vec![3]);
    assert_eq!(result.documents[0].text, "doc three");
    assert_eq!(result.documents[0].vector, vec![0.0, 0.0, 1.0, 0.0]);
    assert_eq!(result.message, ALL_DOCUMENTS);
}

#[test]
fn results_follow_rank_order() {
    let engine = seeded(true);
    let result = engine.answer_query(&near_three(), 5, 0.0);
    assert_eq!(result.ids(), vec![3, 4, 1, 2, 5]);
}

#[test]
fn selection_narrows_results() {
    let engine = seeded(true);
    assert_eq!(engine.select(&[1, 2]).unwrap(), vec![1, 2]);

    let result = engine.answer_query(&near_three(), 5, 0.0);
    assert_eq!(result.ids(), vec![1, 2]);
    assert_eq!(result.message, SELECTED_DOCUMENTS);
}

#[test]
fn selection_outside_top_k_yields_nothing() {
    let engine = seeded(true);
    engine.select(&[1, 2]).unwrap();

    let result = engine.answer_query(&near_three(), 2, 0.0);
    assert!(result.is_empty());
    assert_eq!(result.message, NO_RELEVANT_DOCUMENTS);
}

#[test]
fn clearing_selection_lifts_restriction() {
    let engine = seeded(true);
    engine.select(&[1, 2]).unwrap();
    engine.clear_selection();
    engine.clear_selection();
    assert!(engine.selection().is_empty());

    let result = engine.answer_query(&near_three(), 1, 0.0);
    assert_eq!(result.ids(), vec![3]);
    assert_eq!(result.message, ALL_DOCUMENTS);
}

#[test]
fn select_unknown_id_fails_no_match() {
    let engine = seeded(true);
    assert!(matches!(engine.select(&[999]), Err(SelectionError::NoMatch)));
    assert!(matches!(engine.select(&[]), Err(SelectionError::EmptySelection)));
}

#[test]
fn select_drops_unknown_ids_and_replaces_wholesale() {
    let engine = seeded(true);
    engine.select(&[1, 2]).unwrap();
    assert_eq!(engine.select(&[4, 999, 4]).unwrap(), vec![4]);
    assert_eq!(engine.selection(), vec![4]);

    // A failed request leaves the previous selection in place.
    assert!(engine.select(&[1000]).is_err());
    assert_eq!(engine.selection(), vec![4]);
}

#[test]
fn ingest_wrong_dimension_changes_nothing() {
    let engine = seeded(true);
    let err = engine.ingest("short", vec![1.0, 2.0]).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Vector(VectorError::DimensionMismatch {
            expected: 4,
            actual: 2
        })
    ));
    let stats = engine.stats().unwrap();
    assert_eq!(stats.indexed, 5);
    assert_eq!(stats.identities, 5);
    assert_eq!(stats.stored, 5);
}

#[test]
fn ingest_rejects_non_finite_vectors() {
    let engine = seeded(true);
    let err = engine
        .ingest("nan", vec![f32::NAN, 0.0, 0.0, 0.0])
        .unwrap_err();
    assert!(matches!(err, EngineError::Codec(_)));
    assert_eq!(engine.stats().unwrap().stored, 5);
}

#[test]
fn index_and_identity_map_stay_aligned() {
    for reindex in [true, false] {
        let engine = engine_with(config(reindex), Arc::new(MemoryDocumentStore::new()));
        for (text, vector) in corpus() {
            engine.ingest(text, vector).unwrap();
            let stats = engine.stats().unwrap();
            assert_eq!(stats.indexed, stats.identities);
            assert_eq!(stats.indexed, stats.stored);
        }
        engine.reload().unwrap();
        let stats = engine.stats().unwrap();
        assert_eq!(stats.indexed, 5);
        assert_eq!(stats.identities, 5);
    }
}

#[test]
fn append_and_reload_paths_agree() {
    let appended = seeded(false);
    let reloaded = seeded(true);
    let q = vec![0.3, 0.2, 0.1, 0.7];
    assert_eq!(
        appended.answer_query(&q, 5, 0.0).ids(),
        reloaded.answer_query(&q, 5, 0.0).ids()
    );
}

#[test]
fn reload_twice_is_idempotent() {
    let engine = seeded(false);
    let first = engine.reload().unwrap();
    let before = engine.answer_query(&near_three(), 5, 0.0);
    let second = engine.reload().unwrap();
    let after = engine.answer_query(&near_three(), 5, 0.0);
    assert_eq!(first, second);
    assert_eq!(before, after);

    let metrics = engine.metrics();
    assert_eq!(metrics.queries(), 2);
    // Startup load plus the two explicit reloads.
    assert_eq!(metrics.index_reloads(), 3);
    assert!(engine.metrics_text().contains("docqa_index_reloads_total 3"));
}

#[test]
fn reload_skips_unreadable_embeddings() {
    let store = Arc::new(MemoryDocumentStore::new());
    store
        .insert("good", &codec::encode(&[1.0, 0.0, 0.0, 0.0]))
        .unwrap();
    store.insert("truncated", &[1, 0, 0]).unwrap();
    store
        .insert("wrong width", &codec::encode(&[1.0, 2.0]))
        .unwrap();
    store
        .insert("also good", &codec::encode(&[0.0, 1.0, 0.0, 0.0]))
        .unwrap();

    let engine = engine_with(config(true), store);
    let report = engine.reload().unwrap();
    assert_eq!(report.loaded, 2);
    assert_eq!(report.skipped, 2);

    let result = engine.answer_query(&[0.0, 1.0, 0.0, 0.0], 5, 0.0);
    assert_eq!(result.ids(), vec![4, 1]);
}

#[test]
fn threshold_filters_distant_documents() {
    let engine = seeded(true);
    // Only doc three (distance 0.02) clears a 0.9 similarity bar.
    let result = engine.answer_query(&near_three(), 5, 0.9);
    assert_eq!(result.ids(), vec![3]);

    let result = engine.answer_query(&[100.0, 100.0, 100.0, 100.0], 5, 0.5);
    assert!(result.is_empty());
    assert_eq!(result.message, NO_RELEVANT_DOCUMENTS);
}

#[test]
fn empty_engine_reports_no_documents() {
    let engine = engine_with(config(true), Arc::new(MemoryDocumentStore::new()));
    let result = engine.answer_query(&near_three(), 5, 0.0);
    assert!(result.is_empty());
    assert_eq!(result.message, NO_RELEVANT_DOCUMENTS);
}

#[test]
fn query_of_wrong_dimension_degrades() {
    let engine = seeded(true);
    let result = engine.answer_query(&[1.0, 0.0], 5, 0.0);
    assert!(result.is_empty());
    assert_eq!(result.message, RETRIEVAL_FAILED);
    assert!(matches!(
        engine.retrieve(&[1.0, 0.0], 5, 0.0),
        Err(EngineError::Vector(VectorError::DimensionMismatch { .. }))
    ));
    assert_eq!(engine.metrics().degraded_queries(), 1);
}

/// Memory store whose reads can be switched off to simulate an outage.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryDocumentStore,
    down: AtomicBool,
}

impl FlakyStore {
    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }
}

impl DocumentStore for FlakyStore {
    fn insert(&self, text: &str, embedding: &[u8]) -> Result<DocumentId, StoreError> {
        self.check()?;
        self.inner.insert(text, embedding)
    }

    fn fetch_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<StoredDocument>, StoreError> {
        self.check()?;
        self.inner.fetch_by_ids(ids)
    }

    fn existing_ids(&self, ids: &[DocumentId]) -> Result<Vec<DocumentId>, StoreError> {
        self.check()?;
        self.inner.existing_ids(ids)
    }

    fn scan_embeddings(&self) -> Result<Vec<(DocumentId, Vec<u8>)>, StoreError> {
        self.check()?;
        self.inner.scan_embeddings()
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.check()?;
        self.inner.count()
    }
}

#[test]
fn store_outage_degrades_query_and_keeps_index() {
    let store = Arc::new(FlakyStore::default());
    let engine = engine_with(config(true), store.clone());
    for (text, vector) in corpus() {
        engine.ingest(text, vector).unwrap();
    }

    store.down.store(true, Ordering::SeqCst);
    let result = engine.answer_query(&near_three(), 3, 0.0);
    assert!(result.is_empty());
    assert_eq!(result.message, RETRIEVAL_FAILED);
    assert!(engine.reload().is_err());
    assert!(matches!(engine.select(&[1]), Err(SelectionError::Store(_))));

    store.down.store(false, Ordering::SeqCst);
    let result = engine.answer_query(&near_three(), 1, 0.0);
    assert_eq!(result.ids(), vec![3]);
}

#[test]
fn ask_composes_answer_from_retrieved_text() {
    let engine = engine_with(config(true), Arc::new(MemoryDocumentStore::new()));
    engine.ingest_text("TEST_VEC:1,0,0,0").unwrap();
    engine.ingest("  Rust is a systems language.  ", vec![0.0, 1.0, 0.0, 0.0]).unwrap();
    engine.ingest("Rust is a systems language.", vec![0.0, 0.9, 0.0, 0.0]).unwrap();
    engine.ingest("   ", vec![0.0, 0.8, 0.0, 0.0]).unwrap();

    let answer = engine.ask_with_k("TEST_VEC:0,1,0,0", 3).unwrap();
    assert_eq!(answer.answer, "Rust is a systems language.");
    assert_eq!(answer.document_ids, vec![2, 3, 4]);
    assert_eq!(answer.message, ALL_DOCUMENTS);

    assert!(matches!(engine.ask("   "), Err(EngineError::EmptyQuestion)));
}

#[test]
fn concurrent_ingest_and_query_keep_pair_aligned() {
    let engine = engine_with(config(false), Arc::new(MemoryDocumentStore::new()));
    std::thread::scope(|scope| {
        for writer in 0..4 {
            let engine = engine.clone();
            scope.spawn(move || {
                for i in 0..50 {
                    let v = vec![writer as f32, i as f32, 0.0, 1.0];
                    engine.ingest(&format!("w{writer}-{i}"), v).unwrap();
                }
            });
        }
        for _ in 0..4 {
            let engine = engine.clone();
            scope.spawn(move || {
                for _ in 0..50 {
                    let result = engine.answer_query(&[1.0, 10.0, 0.0, 1.0], 5, 0.0);
                    assert_ne!(result.message, RETRIEVAL_FAILED);
                    assert!(result.documents.len() <= 5);
                }
            });
        }
    });

    let stats = engine.stats().unwrap();
    assert_eq!(stats.stored, 200);
    assert_eq!(stats.indexed, 200);
    assert_eq!(stats.identities, 200);
    let fresh = engine.answer_query(&[1.0, 10.0, 0.0, 1.0], 10, 0.0);
    engine.reload().unwrap();
    assert_eq!(engine.answer_query(&[1.0, 10.0, 0.0, 1.0], 10, 0.0), fresh);
}
