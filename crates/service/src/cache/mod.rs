//! Query cache shared by the pages of one session.
//!
//! Each [`QueryKey`] owns a slot with the latest snapshot and at most one
//! request in flight. Every request is stamped with a generation number taken
//! from a cache-wide counter; when it finishes, its result is stored only if
//! the slot still expects that generation. Anything older (superseded by
//! `refetch`, fenced by `invalidate`, or whose slot was removed) still resolves
//! the callers that joined it but never touches the stored state.

mod key;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::PortalApi;
use crate::errors::ApiError;
use crate::observability::{CACHE_DISCARDED_TOTAL, CACHE_LOOKUPS_TOTAL};

pub use key::{QueryData, QueryKey};

pub type QueryResult = Result<Arc<QueryData>, ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Slot exists but nothing was requested yet (or it was fenced before the first answer).
    Idle,
    /// First request in flight, no data yet.
    Pending,
    Success,
    Error,
}

/// What a subscriber sees for one key.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub status: QueryStatus,
    /// Last good value. Kept when a later request fails.
    pub data: Option<Arc<QueryData>>,
    pub error: Option<ApiError>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// A request for this key is in flight.
    pub fetching: bool,
    /// Invalidated since the last success; the next `fetch` goes to the network.
    pub stale: bool,
    pub generation: u64,
}

impl QuerySnapshot {
    fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            last_fetched_at: None,
            fetching: false,
            stale: false,
            generation: 0,
        }
    }

    /// Snapshot for a result whose slot no longer exists.
    pub fn from_result(result: QueryResult) -> Self {
        let mut snap = Self::idle();
        match result {
            Ok(data) => {
                snap.status = QueryStatus::Success;
                snap.data = Some(data);
                snap.last_fetched_at = Some(Utc::now());
            }
            Err(e) => {
                snap.status = QueryStatus::Error;
                snap.error = Some(e);
            }
        }
        snap
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, QueryStatus::Idle | QueryStatus::Pending)
    }

    fn is_fresh_success(&self) -> bool {
        self.status == QueryStatus::Success && !self.stale && self.data.is_some()
    }
}

struct InFlight {
    generation: u64,
    done: watch::Receiver<Option<QueryResult>>,
}

struct Slot {
    state: watch::Sender<QuerySnapshot>,
    /// Generation whose answer will be stored; 0 when none is expected.
    expected: u64,
    in_flight: Option<InFlight>,
}

impl Slot {
    fn new() -> Self {
        let (state, _) = watch::channel(QuerySnapshot::idle());
        Self { state, expected: 0, in_flight: None }
    }
}

struct CacheInner {
    api: Arc<dyn PortalApi>,
    slots: DashMap<QueryKey, Slot>,
    next_generation: AtomicU64,
}

enum Begin {
    Fresh(Arc<QueryData>),
    Wait(watch::Receiver<Option<QueryResult>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Fresh data answers; otherwise join or issue.
    Cached,
    /// Join the request in flight, else issue one even when data is fresh.
    Revalidate,
    /// Issue a new request and supersede the one in flight.
    Force,
}

/// Cloning shares the same cache.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.slots.len())
            .finish_non_exhaustive()
    }
}

impl QueryCache {
    pub fn new(api: Arc<dyn PortalApi>) -> Self {
        Self {
            inner: Arc::new(CacheInner { api, slots: DashMap::new(), next_generation: AtomicU64::new(1) }),
        }
    }

    pub fn api(&self) -> &Arc<dyn PortalApi> {
        &self.inner.api
    }

    /// Cached value if fresh, else join the in-flight request, else issue one.
    pub async fn fetch(&self, key: QueryKey) -> QueryResult {
        self.run(&key, Mode::Cached).await
    }

    /// Always issue a new request; an older one still in flight is superseded.
    pub async fn refetch(&self, key: QueryKey) -> QueryResult {
        self.run(&key, Mode::Force).await
    }

    /// Ask the backend again, joining a request already in flight for the key.
    /// Returns the slot's snapshot, so a failed request still shows the last
    /// good data next to its error. Page loads go through here.
    pub async fn revalidate(&self, key: QueryKey) -> QuerySnapshot {
        let result = self.run(&key, Mode::Revalidate).await;
        self.get(&key).unwrap_or_else(|| QuerySnapshot::from_result(result))
    }

    /// `fetch`, then the slot's snapshot (which keeps earlier data when the
    /// request failed).
    pub async fn load(&self, key: QueryKey) -> QuerySnapshot {
        let result = self.fetch(key.clone()).await;
        self.get(&key).unwrap_or_else(|| QuerySnapshot::from_result(result))
    }

    pub fn get(&self, key: &QueryKey) -> Option<QuerySnapshot> {
        self.inner.slots.get(key).map(|slot| slot.state.borrow().clone())
    }

    /// Observe a key. Starts the request when the key has nothing usable yet.
    pub fn subscribe(&self, key: QueryKey) -> QuerySubscription {
        let (rx, needs_fetch) = {
            let slot = self.inner.slots.entry(key.clone()).or_insert_with(Slot::new);
            let snap = slot.state.borrow();
            let needs_fetch = slot.in_flight.is_none()
                && (snap.status == QueryStatus::Idle || snap.stale);
            drop(snap);
            (slot.state.subscribe(), needs_fetch)
        };
        if needs_fetch {
            let _ = self.begin(&key, Mode::Cached);
        }
        QuerySubscription { key, rx }
    }

    /// Mark stale and fence the request in flight. Keys with live subscribers
    /// are refetched right away.
    pub fn invalidate(&self, key: &QueryKey) {
        let has_subscribers = {
            let Some(mut slot) = self.inner.slots.get_mut(key) else { return };
            slot.expected = 0;
            slot.in_flight = None;
            slot.state.send_modify(|s| {
                s.stale = true;
                s.fetching = false;
                if s.status == QueryStatus::Pending {
                    s.status = QueryStatus::Idle;
                }
            });
            slot.state.receiver_count() > 0
        };
        debug!(key = %key, has_subscribers, "query invalidated");
        if has_subscribers {
            let _ = self.begin(key, Mode::Cached);
        }
    }

    /// Drop one entry; its subscribers see the channel close.
    pub fn remove(&self, key: &QueryKey) {
        self.inner.slots.remove(key);
    }

    /// Drop every entry; all of them belong to the signed-in account.
    pub fn clear(&self) {
        let removed = self.inner.slots.len();
        self.inner.slots.clear();
        debug!(removed, "query cache cleared");
    }

    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    async fn run(&self, key: &QueryKey, mode: Mode) -> QueryResult {
        match self.begin(key, mode) {
            Begin::Fresh(data) => Ok(data),
            Begin::Wait(done) => wait_done(done).await,
        }
    }

    fn begin(&self, key: &QueryKey, mode: Mode) -> Begin {
        let mut slot = self.inner.slots.entry(key.clone()).or_insert_with(Slot::new);

        if mode != Mode::Force {
            if let Some(in_flight) = &slot.in_flight {
                CACHE_LOOKUPS_TOTAL.with_label_values(&["joined"]).inc();
                debug!(key = %key, generation = in_flight.generation, "joining in-flight request");
                return Begin::Wait(in_flight.done.clone());
            }
        }
        if mode == Mode::Cached {
            let snap = slot.state.borrow();
            if snap.is_fresh_success() {
                if let Some(data) = snap.data.clone() {
                    CACHE_LOOKUPS_TOTAL.with_label_values(&["hit"]).inc();
                    return Begin::Fresh(data);
                }
            }
        }

        CACHE_LOOKUPS_TOTAL.with_label_values(&["miss"]).inc();
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst);
        let (done_tx, done_rx) = watch::channel(None);
        slot.expected = generation;
        slot.in_flight = Some(InFlight { generation, done: done_rx.clone() });
        slot.state.send_modify(|s| {
            s.fetching = true;
            s.generation = generation;
            if s.data.is_none() {
                s.status = QueryStatus::Pending;
            }
        });
        drop(slot);

        debug!(key = %key, generation, "issuing request");
        let inner = Arc::clone(&self.inner);
        let key = key.clone();
        tokio::spawn(async move {
            let result = key.run(inner.api.as_ref()).await.map(Arc::new);
            inner.complete(&key, generation, &result);
            let _ = done_tx.send(Some(result));
        });
        Begin::Wait(done_rx)
    }
}

impl CacheInner {
    fn complete(&self, key: &QueryKey, generation: u64, result: &QueryResult) {
        let Some(mut slot) = self.slots.get_mut(key) else {
            CACHE_DISCARDED_TOTAL.inc();
            debug!(key = %key, generation, "response for removed entry discarded");
            return;
        };
        if slot.expected != generation {
            CACHE_DISCARDED_TOTAL.inc();
            debug!(key = %key, generation, expected = slot.expected, "stale response discarded");
            return;
        }
        slot.expected = 0;
        slot.in_flight = None;
        slot.state.send_modify(|s| {
            s.fetching = false;
            match result {
                Ok(data) => {
                    s.status = QueryStatus::Success;
                    s.data = Some(Arc::clone(data));
                    s.error = None;
                    s.stale = false;
                    s.last_fetched_at = Some(Utc::now());
                }
                Err(e) => {
                    s.status = QueryStatus::Error;
                    s.error = Some(e.clone());
                }
            }
        });
        if let Err(e) = result {
            warn!(key = %key, error = %e, "query failed");
        }
    }
}

async fn wait_done(mut done: watch::Receiver<Option<QueryResult>>) -> QueryResult {
    match done.wait_for(Option::is_some).await {
        Ok(value) => (*value)
            .clone()
            .unwrap_or_else(|| Err(ApiError::Transport("request finished without a result".into()))),
        Err(_) => Err(ApiError::Transport("request task ended without a result".into())),
    }
}

/// Live view of one key. Dropping it unsubscribes; answers that arrive later
/// are simply not observed.
pub struct QuerySubscription {
    key: QueryKey,
    rx: watch::Receiver<QuerySnapshot>,
}

impl QuerySubscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn current(&self) -> QuerySnapshot {
        self.rx.borrow().clone()
    }

    /// Next snapshot, or `None` once the entry was removed.
    pub async fn changed(&mut self) -> Option<QuerySnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until no request is in flight and the entry holds an answer.
    pub async fn settled(&mut self) -> Option<QuerySnapshot> {
        let snap = self
            .rx
            .wait_for(|s| !s.fetching && matches!(s.status, QueryStatus::Success | QueryStatus::Error))
            .await
            .ok()?;
        Some((*snap).clone())
    }
}
