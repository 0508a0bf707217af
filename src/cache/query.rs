//! Shared query cache with request deduplication and tag invalidation
//!
//! Every domain client reads through one [`QueryCache`]. A read mounts a
//! [`Query`] handle; identical keys share one cache entry and at most one
//! in-flight request. Writes go through [`QueryCache::mutate`], which
//! invalidates the mutation's tags once the server accepted it.
//!
//! Fetches run on spawned Tokio tasks, so queries must be created inside
//! a Tokio runtime. A request that outlives every handle still completes
//! and populates the cache. Entries nobody is mounted on are kept for
//! [`DEFAULT_KEEP_UNUSED`] (see [`QueryCache::with_keep_unused`]) and then
//! evicted.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;

use super::graph::{select_invalidated, MutationEndpoint, QueryEndpoint};
use super::key::QueryKey;
use super::tags::Tag;
use crate::error::{Error, Result};

/// Future producing a raw JSON response
pub type FetchFuture = BoxFuture<'static, Result<Value>>;

/// Issues the network request behind a cache entry; called once per fetch
pub type Fetcher = Arc<dyn Fn() -> FetchFuture + Send + Sync>;

type SharedFetch = Shared<FetchFuture>;

/// How long an entry without consumers stays cached
pub const DEFAULT_KEEP_UNUSED: Duration = Duration::from_secs(60);

/// Wrap a request factory as a [`Fetcher`]
pub fn fetcher<F, Fut>(request: F) -> Fetcher
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(move || request().boxed())
}

struct Entry {
    endpoint: QueryEndpoint,
    fetcher: Fetcher,
    data: Option<Value>,
    error: Option<Error>,
    provided: Vec<Tag>,
    subscribers: usize,
    in_flight: Option<(u64, SharedFetch)>,
    issued: u64,
    applied: u64,
    stale: bool,
    /// Invalidated while a request was in flight
    rerun: bool,
    /// Bumped each time the entry becomes unused
    unused_since: u64,
    version: watch::Sender<u64>,
}

impl Entry {
    fn new(endpoint: QueryEndpoint, fetcher: Fetcher) -> Self {
        let (version, _) = watch::channel(0);
        // Until the first response lands, the entry answers to the tags a
        // failed request would provide, so early writes still reach it.
        let provided = endpoint.provides(None);
        Self {
            endpoint,
            fetcher,
            data: None,
            error: None,
            provided,
            subscribers: 0,
            in_flight: None,
            issued: 0,
            applied: 0,
            stale: false,
            rerun: false,
            unused_since: 0,
            version,
        }
    }

    fn needs_fetch(&self) -> bool {
        self.in_flight.is_none() && (self.stale || self.data.is_none())
    }

    fn is_unused(&self) -> bool {
        self.subscribers == 0 && self.in_flight.is_none()
    }

    /// Most recently applied response
    fn current(&self) -> Option<Result<Value>> {
        match (&self.error, &self.data) {
            (Some(err), _) => Some(Err(err.clone())),
            (None, Some(data)) => Some(Ok(data.clone())),
            (None, None) => None,
        }
    }
}

/// Cache shared by every domain client
#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, Entry>>>,
    keep_unused: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self {
            entries: Arc::default(),
            keep_unused: DEFAULT_KEEP_UNUSED,
        }
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.lock().len())
            .field("keep_unused", &self.keep_unused)
            .finish()
    }
}

impl QueryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep entries without consumers for `keep_unused` before evicting
    ///
    /// A zero window evicts as soon as the last consumer unmounts and no
    /// request is pending.
    pub fn with_keep_unused(mut self, keep_unused: Duration) -> Self {
        self.keep_unused = keep_unused;
        self
    }

    /// Number of cached entries, mounted or not
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mount a consumer of `key`, fetching when nothing usable is cached
    pub fn subscribe<T>(&self, endpoint: QueryEndpoint, key: QueryKey, fetcher: Fetcher) -> Query<T> {
        let mut entries = self.lock();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(endpoint, fetcher));
        entry.subscribers += 1;

        if entry.needs_fetch() {
            let _ = self.start_fetch(&key, entry);
        } else {
            debug!("{} served from cache", key);
        }

        let changes = entry.version.subscribe();
        drop(entries);

        Query {
            cache: self.clone(),
            key,
            changes,
            _marker: PhantomData,
        }
    }

    /// Mount `endpoint` with `params`, keyed by their stable serialization
    pub fn query<T, P, F, Fut>(&self, endpoint: QueryEndpoint, params: &P, request: F) -> Result<Query<T>>
    where
        P: Serialize + ?Sized,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let key = QueryKey::new(endpoint.name(), params)?;
        Ok(self.subscribe(endpoint, key, fetcher(request)))
    }

    /// Issue request `#issued + 1`; callers make sure nothing is in flight
    fn start_fetch(&self, key: &QueryKey, entry: &mut Entry) -> (u64, SharedFetch) {
        entry.issued += 1;
        let seq = entry.issued;
        debug!("fetching {} (#{})", key, seq);

        let request = (entry.fetcher)();
        let cache = self.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = request.await;
            cache.apply(&task_key, seq, &result);
            result
        });

        let cache = self.clone();
        let task_key = key.clone();
        let shared = async move {
            match handle.await {
                Ok(result) => result,
                Err(err) => {
                    // the task never reached apply, release the entry here
                    let result = Err(Error::Task(err.to_string()));
                    cache.apply(&task_key, seq, &result);
                    result
                }
            }
        }
        .boxed()
        .shared();

        entry.in_flight = Some((seq, shared.clone()));
        (seq, shared)
    }

    fn apply(&self, key: &QueryKey, seq: u64, result: &Result<Value>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };

        let landed = matches!(&entry.in_flight, Some((in_flight, _)) if *in_flight == seq);
        if landed {
            entry.in_flight = None;
        }
        if seq < entry.applied {
            debug!(
                "discarding stale response for {} (#{} after #{})",
                key, seq, entry.applied
            );
            return;
        }

        entry.applied = seq;
        entry.stale = false;
        match result {
            Ok(value) => {
                entry.provided = entry.endpoint.provides(Some(value));
                entry.data = Some(value.clone());
                entry.error = None;
            }
            Err(err) => {
                debug!("{} failed: {}", key, err);
                entry.provided = entry.endpoint.provides(entry.data.as_ref());
                entry.error = Some(err.clone());
            }
        }
        entry.version.send_replace(seq);

        if landed && entry.rerun {
            entry.rerun = false;
            if entry.subscribers > 0 {
                debug!("{} was invalidated in flight, fetching again", key);
                let _ = self.start_fetch(key, entry);
            } else {
                entry.stale = true;
            }
        }

        if entry.is_unused() {
            self.release(&mut entries, key);
        }
    }

    /// Schedule eviction of an entry that just became unused
    fn release(&self, entries: &mut HashMap<QueryKey, Entry>, key: &QueryKey) {
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        entry.unused_since += 1;
        let generation = entry.unused_since;

        // Drop can run after the runtime is gone; evict right away then
        match Handle::try_current() {
            Ok(runtime) if !self.keep_unused.is_zero() => {
                let cache = self.clone();
                let key = key.clone();
                let keep_unused = self.keep_unused;
                runtime.spawn(async move {
                    tokio::time::sleep(keep_unused).await;
                    cache.evict(&key, generation);
                });
            }
            _ => {
                debug!("evicting {}", key);
                entries.remove(key);
            }
        }
    }

    fn evict(&self, key: &QueryKey, generation: u64) {
        let mut entries = self.lock();
        let expired = entries
            .get(key)
            .map(|entry| entry.is_unused() && entry.unused_since == generation)
            .unwrap_or(false);
        if expired {
            debug!("evicting unused {}", key);
            entries.remove(key);
        }
    }

    /// Result for a caller that awaited request `seq`
    ///
    /// A newer response may have landed before the caller woke up; the
    /// applied state wins over the awaited one.
    fn settle(&self, key: &QueryKey, seq: u64, awaited: Result<Value>) -> Result<Value> {
        let entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.applied > seq => entry.current().unwrap_or(awaited),
            _ => awaited,
        }
    }

    async fn resolve(&self, key: &QueryKey) -> Result<Value> {
        let (seq, pending) = {
            let mut entries = self.lock();
            let entry = entries
                .get_mut(key)
                .ok_or_else(|| Error::validation(format!("{} is not mounted", key)))?;

            match entry.in_flight.clone() {
                Some(in_flight) => in_flight,
                None => match entry.current() {
                    Some(current) if !entry.stale => return current,
                    _ => self.start_fetch(key, entry),
                },
            }
        };
        let result = pending.await;
        self.settle(key, seq, result)
    }

    /// Fresh request for `key`, never running two at once
    ///
    /// A request already in flight was issued before this call, so it is
    /// awaited first and followed by a new one unless a newer request has
    /// started meanwhile.
    async fn refetch(&self, key: &QueryKey) -> Result<Value> {
        let (seq, pending, joined) = {
            let mut entries = self.lock();
            let entry = entries
                .get_mut(key)
                .ok_or_else(|| Error::validation(format!("{} is not mounted", key)))?;

            match entry.in_flight.clone() {
                Some((seq, pending)) => (seq, pending, true),
                None => {
                    let (seq, pending) = self.start_fetch(key, entry);
                    (seq, pending, false)
                }
            }
        };
        let result = pending.await;
        if !joined {
            return self.settle(key, seq, result);
        }

        let (seq, pending) = {
            let mut entries = self.lock();
            let Some(entry) = entries.get_mut(key) else {
                return result;
            };
            match entry.in_flight.clone() {
                Some((next, pending)) if next > seq => (next, pending),
                _ => self.start_fetch(key, entry),
            }
        };
        let result = pending.await;
        self.settle(key, seq, result)
    }

    fn snapshot(&self, key: &QueryKey) -> (Option<Value>, Option<Error>, bool) {
        let entries = self.lock();
        match entries.get(key) {
            Some(entry) => (
                entry.data.clone(),
                entry.error.clone(),
                entry.in_flight.is_some(),
            ),
            None => (None, None, false),
        }
    }

    fn unsubscribe(&self, key: &QueryKey) {
        let mut entries = self.lock();
        let unused = match entries.get_mut(key) {
            Some(entry) => {
                entry.subscribers = entry.subscribers.saturating_sub(1);
                entry.is_unused()
            }
            None => false,
        };
        if unused {
            self.release(&mut entries, key);
        }
    }

    /// Number of mounted consumers of `key`
    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.lock().get(key).map(|entry| entry.subscribers).unwrap_or(0)
    }

    /// Tags currently attached to `key`
    pub fn provided_tags(&self, key: &QueryKey) -> Vec<Tag> {
        self.lock()
            .get(key)
            .map(|entry| entry.provided.clone())
            .unwrap_or_default()
    }

    /// Refetch mounted queries providing any of `tags`, mark the rest stale
    ///
    /// An entry with a request in flight is refetched once that request
    /// lands, so a key never has two requests running.
    pub fn invalidate(&self, tags: &[Tag]) -> Vec<QueryKey> {
        let mut entries = self.lock();
        let keys = select_invalidated(
            entries.iter().map(|(key, entry)| (key, entry.provided.as_slice())),
            tags,
        );

        for key in &keys {
            if let Some(entry) = entries.get_mut(key) {
                if entry.in_flight.is_some() {
                    debug!("{} invalidated in flight", key);
                    entry.rerun = true;
                } else if entry.subscribers > 0 {
                    let _ = self.start_fetch(key, entry);
                } else {
                    debug!("{} marked stale", key);
                    entry.stale = true;
                }
            }
        }

        keys.into_iter().collect()
    }

    /// Run a write; on success invalidate the endpoint's tags
    ///
    /// Failures are returned untouched and leave the cache as it was. No
    /// retry is attempted.
    pub async fn mutate<T, F>(&self, endpoint: MutationEndpoint, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = request.await;
        match &result {
            Ok(_) => {
                let refetching = self.invalidate(&endpoint.invalidates());
                info!(
                    "{} succeeded, {} queries invalidated",
                    endpoint.name(),
                    refetching.len()
                );
            }
            Err(err) => warn!("{} failed: {}", endpoint.name(), err),
        }
        result
    }
}

/// Observable lifecycle of a query
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub error: Option<Error>,
    /// No data yet and a request is pending
    pub is_loading: bool,
    /// A request is pending
    pub is_fetching: bool,
}

impl<T> QueryState<T> {
    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }
}

/// Responses that carry a list of items
pub trait Listing {
    fn item_count(&self) -> usize;
}

impl<T> Listing for Vec<T> {
    fn item_count(&self) -> usize {
        self.len()
    }
}

/// What a list page should render
#[derive(Debug)]
pub enum ListStatus<'a, T> {
    Loading,
    Failed(&'a Error),
    Empty,
    Ready(&'a T),
}

impl<T: Listing> QueryState<T> {
    pub fn list_status(&self) -> ListStatus<'_, T> {
        match (&self.data, &self.error) {
            (_, Some(err)) => ListStatus::Failed(err),
            (None, None) => ListStatus::Loading,
            (Some(data), None) if data.item_count() == 0 => ListStatus::Empty,
            (Some(data), None) => ListStatus::Ready(data),
        }
    }
}

/// A mounted read; dropping it unmounts the consumer
pub struct Query<T> {
    cache: QueryCache,
    key: QueryKey,
    changes: watch::Receiver<u64>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Query<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Current result, joining the in-flight request if there is one
    pub async fn result(&self) -> Result<T> {
        let value = self.cache.resolve(&self.key).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Issue a fresh request for the same key
    ///
    /// Waits for a request already in flight before issuing the new one.
    pub async fn refetch(&self) -> Result<T> {
        let value = self.cache.refetch(&self.key).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Non-blocking snapshot for rendering
    pub fn state(&self) -> QueryState<T> {
        let (data, error, is_fetching) = self.cache.snapshot(&self.key);
        let (data, error) = match data.map(serde_json::from_value::<T>) {
            Some(Ok(data)) => (Some(data), error),
            Some(Err(err)) => (None, Some(Error::from(err))),
            None => (None, error),
        };
        QueryState {
            is_loading: is_fetching && data.is_none(),
            is_fetching,
            data,
            error,
        }
    }

    /// Wait until the cached value for this key changes
    ///
    /// Returns `false` once the cache is gone.
    pub async fn changed(&mut self) -> bool {
        self.changes.changed().await.is_ok()
    }
}

impl<T> Drop for Query<T> {
    fn drop(&mut self) {
        self.cache.unsubscribe(&self.key);
    }
}
