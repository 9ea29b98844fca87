//! Detail document cache with bounded-concurrency prefetch
//!
//! Each entity id owns one slot. A slot is settled exactly once, either with
//! the parsed document or with the error message of the failed fetch, and is
//! never retried afterwards. Overlapping requests for the same id wait on the
//! same in-flight fetch.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use parl_common::{DetailDocument, Entity, Error};
use reqwest::Url;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::fetch::JsonSource;

/// Upper bound on concurrent detail fetches during a prefetch
pub const MAX_PREFETCH_WORKERS: usize = 8;

type Outcome = std::result::Result<Arc<DetailDocument>, String>;
type Slot = Arc<OnceCell<Outcome>>;

/// Counts for one prefetch call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchReport {
    /// Entities queued (unsettled, deduplicated, with an id and a detail file)
    pub requested: usize,
    /// Queued entities whose document is now cached
    pub fetched: usize,
    /// Queued entities whose fetch failed
    pub failed: usize,
}

pub struct DetailStore {
    source: Arc<dyn JsonSource>,
    details_root: Url,
    slots: Mutex<HashMap<String, Slot>>,
}

impl DetailStore {
    pub fn new(source: Arc<dyn JsonSource>, details_root: Url) -> Self {
        Self {
            source,
            details_root,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, id: &str) -> Slot {
        self.slots()
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    fn settled(&self, id: &str) -> Option<Outcome> {
        self.slots().get(id).and_then(|slot| slot.get().cloned())
    }

    /// Cached document for `id`
    pub fn detail(&self, id: &str) -> Option<Arc<DetailDocument>> {
        self.settled(id).and_then(Result::ok)
    }

    /// Cached error message for `id`
    pub fn failure(&self, id: &str) -> Option<String> {
        self.settled(id).and_then(Result::err)
    }

    /// True once a fetch for `id` has succeeded or failed
    pub fn is_settled(&self, id: &str) -> bool {
        self.settled(id).is_some()
    }

    /// Settled slots as (cached documents, cached failures)
    pub fn settled_counts(&self) -> (usize, usize) {
        self.slots()
            .values()
            .filter_map(|slot| slot.get())
            .fold((0, 0), |(ok, failed), outcome| match outcome {
                Ok(_) => (ok + 1, failed),
                Err(_) => (ok, failed + 1),
            })
    }

    /// Returns the document for `entity`, fetching it on first use.
    ///
    /// `None` when the entity has no id or no detail file, or when its fetch
    /// failed (now or earlier).
    pub async fn fetch_details(&self, entity: &Entity) -> Option<Arc<DetailDocument>> {
        let id = entity.key()?;
        let Some(filename) = entity.detail_file() else {
            debug!(id, "{}", Error::MissingDetail(id.to_string()));
            return None;
        };

        let slot = self.slot(id);
        let outcome = slot.get_or_init(|| self.load(id, filename)).await;
        outcome.as_ref().ok().cloned()
    }

    async fn load(&self, id: &str, filename: &str) -> Outcome {
        let url = match self.details_root.join(filename) {
            Ok(url) => url,
            Err(e) => {
                warn!(id, filename, error = %e, "Detail document path is not a valid URL");
                return Err(e.to_string());
            }
        };

        let result = match self.source.fetch_json(url.as_str()).await {
            Ok(value) => DetailDocument::from_json(value),
            Err(e) => Err(e),
        };

        match result {
            Ok(document) => Ok(Arc::new(document)),
            Err(e) => {
                warn!(id, url = %url, error = %e, "Detail load failed");
                Err(e.to_string())
            }
        }
    }

    /// Fetches every unsettled entity with at most [`MAX_PREFETCH_WORKERS`]
    /// fetches in flight; returns once all of them have settled.
    pub async fn prefetch<'a, I>(&self, entities: I) -> PrefetchReport
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let mut seen = HashSet::new();
        let pending: VecDeque<(&str, &Entity)> = entities
            .into_iter()
            .filter_map(|entity| {
                let id = entity.key()?;
                entity.detail_file()?;
                (!self.is_settled(id) && seen.insert(id)).then_some((id, entity))
            })
            .collect();

        let requested = pending.len();
        if requested == 0 {
            return PrefetchReport::default();
        }

        let ids: Vec<&str> = pending.iter().map(|(id, _)| *id).collect();
        let worker_count = MAX_PREFETCH_WORKERS.min(requested);
        debug!(requested, workers = worker_count, "Starting detail prefetch");

        let queue = Mutex::new(pending);
        let next = || queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();

        let workers = (0..worker_count).map(|_| async {
            while let Some((_, entity)) = next() {
                self.fetch_details(entity).await;
            }
        });
        join_all(workers).await;

        let fetched = ids.iter().filter(|id| self.detail(id).is_some()).count();
        let report = PrefetchReport {
            requested,
            fetched,
            failed: requested - fetched,
        };
        info!(
            requested = report.requested,
            fetched = report.fetched,
            failed = report.failed,
            "Detail prefetch complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const ROOT: &str = "http://data.test/output/parlementaires/";

    /// Serves `{"analysis": {"status": "OUI"}}` for every URL except those
    /// containing "broken", counting calls and concurrent fetches.
    #[derive(Default)]
    struct CountingSource {
        calls: Mutex<HashMap<String, usize>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl CountingSource {
        fn calls_for(&self, file: &str) -> usize {
            let url = format!("{}{}", ROOT, file);
            self.calls.lock().unwrap().get(&url).copied().unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().values().sum()
        }
    }

    #[async_trait]
    impl JsonSource for CountingSource {
        async fn fetch_json(&self, url: &str) -> parl_common::Result<Value> {
            *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if url.contains("broken") {
                return Err(Error::Transport {
                    url: url.to_string(),
                    message: "HTTP 404 Not Found".to_string(),
                });
            }
            Ok(json!({"analysis": {"status": "OUI"}}))
        }
    }

    fn entity(id: &str, filename: &str) -> Entity {
        Entity {
            id: Some(id.to_string()),
            filename: Some(filename.to_string()),
            ..Default::default()
        }
    }

    fn store(source: Arc<CountingSource>) -> DetailStore {
        DetailStore::new(source, Url::parse(ROOT).unwrap())
    }

    #[tokio::test]
    async fn test_prefetch_bounds_concurrency() {
        let source = Arc::new(CountingSource::default());
        let store = store(source.clone());
        let entities: Vec<Entity> = (0..30)
            .map(|i| entity(&i.to_string(), &format!("{}.json", i)))
            .collect();

        let report = store.prefetch(&entities).await;

        assert_eq!(report.requested, 30);
        assert_eq!(report.fetched, 30);
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), MAX_PREFETCH_WORKERS);
        assert_eq!(source.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_small_queue_uses_fewer_workers() {
        let source = Arc::new(CountingSource::default());
        let store = store(source.clone());
        let entities = vec![entity("1", "1.json"), entity("2", "2.json"), entity("3", "3.json")];

        store.prefetch(&entities).await;

        assert!(source.max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_each_id_fetched_once_and_prefetch_idempotent() {
        let source = Arc::new(CountingSource::default());
        let store = store(source.clone());
        let entities = vec![
            entity("1", "1.json"),
            entity("1", "1.json"),
            entity("2", "2.json"),
            entity("3", "broken.json"),
        ];

        let first = store.prefetch(&entities).await;
        assert_eq!(first.requested, 3);
        assert_eq!(first.fetched, 2);
        assert_eq!(first.failed, 1);
        assert_eq!(source.total_calls(), 3);

        let second = store.prefetch(&entities).await;
        assert_eq!(second, PrefetchReport::default());
        assert_eq!(source.total_calls(), 3);
        assert_eq!(source.calls_for("1.json"), 1);
    }

    #[tokio::test]
    async fn test_success_and_failure_caches_are_disjoint() {
        let source = Arc::new(CountingSource::default());
        let store = store(source.clone());
        let entities = vec![entity("ok", "ok.json"), entity("ko", "broken.json")];

        store.prefetch(&entities).await;

        assert!(store.detail("ok").is_some());
        assert!(store.failure("ok").is_none());
        assert!(store.detail("ko").is_none());
        assert_eq!(store.failure("ko").as_deref(), Some("HTTP 404 Not Found"));
        assert!(store.is_settled("ok") && store.is_settled("ko"));
        assert!(!store.is_settled("unknown"));
        assert_eq!(store.settled_counts(), (1, 1));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_retried() {
        let source = Arc::new(CountingSource::default());
        let store = store(source.clone());
        let broken = entity("ko", "broken.json");

        assert!(store.fetch_details(&broken).await.is_none());
        assert!(store.fetch_details(&broken).await.is_none());
        assert_eq!(source.calls_for("broken.json"), 1);
    }

    #[tokio::test]
    async fn test_missing_filename_or_id_never_fetches() {
        let source = Arc::new(CountingSource::default());
        let store = store(source.clone());
        let no_file = Entity {
            id: Some("1".to_string()),
            filename: Some("nan".to_string()),
            ..Default::default()
        };
        let no_id = entity("  ", "2.json");

        assert!(store.fetch_details(&no_file).await.is_none());
        assert!(store.fetch_details(&no_id).await.is_none());
        assert_eq!(store.prefetch(&[no_file, no_id]).await.requested, 0);
        assert_eq!(source.total_calls(), 0);
        assert!(!store.is_settled("1"));
    }

    #[tokio::test]
    async fn test_overlapping_requests_share_one_fetch() {
        let source = Arc::new(CountingSource::default());
        let store = store(source.clone());
        let target = entity("1", "1.json");

        let (a, b) = tokio::join!(store.fetch_details(&target), store.fetch_details(&target));

        assert!(a.is_some() && b.is_some());
        assert_eq!(source.calls_for("1.json"), 1);
    }

    #[tokio::test]
    async fn test_non_object_document_is_a_failure() {
        struct ArraySource;

        #[async_trait]
        impl JsonSource for ArraySource {
            async fn fetch_json(&self, _url: &str) -> parl_common::Result<Value> {
                Ok(json!([1, 2, 3]))
            }
        }

        let store = DetailStore::new(Arc::new(ArraySource), Url::parse(ROOT).unwrap());
        assert!(store.fetch_details(&entity("1", "1.json")).await.is_none());
        assert!(store.failure("1").unwrap().starts_with("JSON parse error"));
    }
}
