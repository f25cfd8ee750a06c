//! Stale-while-revalidate cache implementation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

use crate::CachePolicy;

/// Outcome of a fetch, shared between every caller waiting on it.
pub type FetchResult<V, E> = Result<Arc<V>, Arc<E>>;

type SharedFetch<V, E> = Shared<BoxFuture<'static, FetchResult<V, E>>>;

struct Entry<V> {
    value: Arc<V>,
    fetched_at: Instant,
    last_read: u64,
}

struct InFlight<V, E> {
    id: u64,
    fetch: SharedFetch<V, E>,
}

struct State<V, E> {
    entries: HashMap<String, Entry<V>>,
    in_flight: HashMap<String, InFlight<V, E>>,
    /// Monotonic counter for read recency and fetch identity.
    clock: u64,
}

struct Inner<V, E> {
    policy: CachePolicy,
    state: Mutex<State<V, E>>,
}

/// Async stale-while-revalidate cache keyed by string.
///
/// Cloning is cheap and clones share the same entries.
///
/// # Concurrency
///
/// The internal mutex is held only for map operations, never across an
/// await point. Fetches run on spawned tokio tasks, so a caller that gives up
/// waiting does not cancel a fetch other callers depend on.
pub struct SwrCache<V, E> {
    inner: Arc<Inner<V, E>>,
}

impl<V, E> Clone for SwrCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, E> SwrCache<V, E>
where
    V: Send + Sync + 'static,
    E: std::fmt::Display + Send + Sync + 'static,
{
    /// Create an empty cache with the given policy.
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                policy,
                state: Mutex::new(State {
                    entries: HashMap::new(),
                    in_flight: HashMap::new(),
                    clock: 0,
                }),
            }),
        }
    }

    /// The policy this cache was created with.
    #[must_use]
    pub fn policy(&self) -> CachePolicy {
        self.inner.policy
    }

    /// Read a value, fetching it with `loader` when needed.
    ///
    /// - fresh entry: returned, `loader` is not called
    /// - expired entry: returned; a background refetch is started unless one
    ///   is already running for `key`
    /// - no entry: waits for the fetch (joining one already in flight)
    ///
    /// Errors are only returned when there is no entry to fall back on, and
    /// are never cached.
    pub async fn fetch<F, Fut>(&self, key: &str, loader: F) -> FetchResult<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let pending = {
            let mut state = self.inner.lock();
            state.clock += 1;
            let now_tick = state.clock;

            if let Some(entry) = state.entries.get_mut(key) {
                entry.last_read = now_tick;
                let value = Arc::clone(&entry.value);
                if entry.fetched_at.elapsed() < self.inner.policy.ttl {
                    return Ok(value);
                }
                if !state.in_flight.contains_key(key) {
                    tracing::debug!(key, "Cache entry expired, refreshing in background");
                    drop(self.start_fetch(&mut state, key, loader()));
                }
                return Ok(value);
            }

            let joined = state.in_flight.get(key).map(|f| f.fetch.clone());
            match joined {
                Some(fetch) => fetch,
                None => {
                    tracing::debug!(key, "Cache miss, fetching");
                    self.start_fetch(&mut state, key, loader())
                }
            }
        };

        pending.await
    }

    /// Read a cached value without fetching, regardless of its age.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.inner
            .lock()
            .entries
            .get(key)
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Drop the entry for `key`.
    ///
    /// A fetch already in flight for `key` still completes for the callers
    /// waiting on it, but its result is not stored.
    pub fn invalidate(&self, key: &str) {
        let mut state = self.inner.lock();
        state.entries.remove(key);
        state.in_flight.remove(key);
        tracing::debug!(key, "Cache entry invalidated");
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register and spawn a fetch for `key`.
    fn start_fetch<Fut>(
        &self,
        state: &mut State<V, E>,
        key: &str,
        load: Fut,
    ) -> SharedFetch<V, E>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        state.clock += 1;
        let id = state.clock;
        let inner = Arc::clone(&self.inner);
        let owned_key = key.to_owned();

        let fetch = async move {
            let result = load.await;
            inner.complete(&owned_key, id, result)
        }
        .boxed()
        .shared();

        state.in_flight.insert(
            key.to_owned(),
            InFlight {
                id,
                fetch: fetch.clone(),
            },
        );
        tokio::spawn(fetch.clone());
        fetch
    }
}

impl<V, E> Inner<V, E>
where
    E: std::fmt::Display,
{
    fn lock(&self) -> MutexGuard<'_, State<V, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the outcome of fetch `id` for `key`.
    fn complete(&self, key: &str, id: u64, result: Result<V, E>) -> FetchResult<V, E> {
        let mut state = self.lock();
        let current = state.in_flight.get(key).is_some_and(|f| f.id == id);
        if current {
            state.in_flight.remove(key);
        }

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                if current {
                    state.clock += 1;
                    let last_read = state.clock;
                    state.entries.insert(
                        key.to_owned(),
                        Entry {
                            value: Arc::clone(&value),
                            fetched_at: Instant::now(),
                            last_read,
                        },
                    );
                    self.evict(&mut state, key);
                }
                Ok(value)
            }
            Err(error) => {
                if state.entries.contains_key(key) {
                    tracing::warn!(key, error = %error, "Background refresh failed, keeping stale entry");
                } else {
                    tracing::warn!(key, error = %error, "Fetch failed");
                }
                Err(Arc::new(error))
            }
        }
    }

    /// Evict least recently read entries above capacity, sparing `keep`.
    fn evict(&self, state: &mut State<V, E>, keep: &str) {
        while state.entries.len() > self.policy.capacity.max(1) {
            let Some(oldest) = state
                .entries
                .iter()
                .filter(|(key, _)| key.as_str() != keep)
                .min_by_key(|(_, entry)| entry.last_read)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            state.entries.remove(&oldest);
            tracing::debug!(key = %oldest, "Cache entry evicted");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[derive(Debug)]
    struct TestError(&'static str);

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    fn cache(capacity: usize) -> SwrCache<String, TestError> {
        SwrCache::new(CachePolicy {
            ttl: Duration::from_secs(300),
            capacity,
        })
    }

    /// Loader that counts its calls and returns `value`.
    fn counting(
        calls: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<String, TestError>> {
        let calls = Arc::clone(calls);
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(value.to_owned())
            }
            .boxed()
        }
    }

    fn failing() -> impl FnOnce() -> BoxFuture<'static, Result<String, TestError>> {
        || async { Err(TestError("upstream down")) }.boxed()
    }

    /// Let spawned background fetches run to completion.
    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_reads_share_one_value() {
        let cache = cache(3);
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.fetch("repo", counting(&calls, "v1")).await.unwrap();
        let second = cache.fetch("repo", counting(&calls, "v2")).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_served_stale_then_refreshed() {
        let cache = cache(3);
        let calls = Arc::new(AtomicUsize::new(0));
        cache.fetch("repo", counting(&calls, "v1")).await.unwrap();

        tokio::time::advance(Duration::from_secs(301)).await;
        let stale = cache.fetch("repo", counting(&calls, "v2")).await.unwrap();

        assert_eq!(stale.as_str(), "v1");
        settle().await;
        assert_eq!(cache.get("repo").unwrap().as_str(), "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_refreshes_once_under_concurrent_reads() {
        let cache = cache(3);
        let calls = Arc::new(AtomicUsize::new(0));
        cache.fetch("repo", counting(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;

        let reads = (0..8).map(|_| cache.fetch("repo", counting(&calls, "v2")));
        let results = futures::future::join_all(reads).await;

        assert!(results.iter().all(|r| r.as_ref().unwrap().as_str() == "v1"));
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_concurrent_reads_share_one_fetch() {
        let cache = cache(3);
        let calls = Arc::new(AtomicUsize::new(0));
        let slow = |calls: &Arc<AtomicUsize>| {
            let calls = Arc::clone(calls);
            move || {
                async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TestError>("v1".to_owned())
                }
                .boxed()
            }
        };

        let (a, b, c) = tokio::join!(
            cache.fetch("repo", slow(&calls)),
            cache.fetch("repo", slow(&calls)),
            cache.fetch("repo", slow(&calls)),
        );

        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_stale_entry() {
        let cache = cache(3);
        let calls = Arc::new(AtomicUsize::new(0));
        cache.fetch("repo", counting(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;

        let stale = cache.fetch("repo", failing()).await;
        settle().await;

        assert_eq!(stale.unwrap().as_str(), "v1");
        assert_eq!(cache.get("repo").unwrap().as_str(), "v1");

        // The next read retries the refresh.
        cache.fetch("repo", counting(&calls, "v2")).await.unwrap();
        settle().await;
        assert_eq!(cache.get("repo").unwrap().as_str(), "v2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_failure_is_not_cached() {
        let cache = cache(3);
        let calls = Arc::new(AtomicUsize::new(0));

        let error = cache.fetch("repo", failing()).await.unwrap_err();
        assert_eq!(error.to_string(), "upstream down");
        assert!(cache.get("repo").is_none());

        let value = cache.fetch("repo", counting(&calls, "v1")).await.unwrap();
        assert_eq!(value.as_str(), "v1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_least_recently_read() {
        let cache = cache(2);
        let calls = Arc::new(AtomicUsize::new(0));
        cache.fetch("a", counting(&calls, "a")).await.unwrap();
        cache.fetch("b", counting(&calls, "b")).await.unwrap();
        cache.fetch("a", counting(&calls, "a")).await.unwrap();

        cache.fetch("c", counting(&calls, "c")).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_refetch() {
        let cache = cache(3);
        let calls = Arc::new(AtomicUsize::new(0));
        cache.fetch("repo", counting(&calls, "v1")).await.unwrap();

        cache.invalidate("repo");
        assert!(cache.is_empty());

        let value = cache.fetch("repo", counting(&calls, "v2")).await.unwrap();
        assert_eq!(value.as_str(), "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_discards_in_flight_result() {
        let cache = cache(3);
        let waiter = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .fetch("repo", || async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, TestError>("old".to_owned())
                    })
                    .await
            })
        };
        settle().await;

        cache.invalidate("repo");
        let value = waiter.await.unwrap().unwrap();

        assert_eq!(value.as_str(), "old");
        assert!(cache.get("repo").is_none());
    }
}
