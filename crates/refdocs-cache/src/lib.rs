//! Stale-while-revalidate cache for refdocs.
//!
//! This crate provides [`SwrCache`], an async key-value cache for values that
//! are expensive to fetch from a remote API and acceptable to serve slightly
//! out of date:
//!
//! - Fresh entries (younger than [`CachePolicy::ttl`]) are returned directly.
//! - Expired entries are still returned immediately, while a single
//!   background task refetches them.
//! - A failed refetch leaves the expired entry in place.
//! - Concurrent misses for the same key share one in-flight fetch.
//! - At most [`CachePolicy::capacity`] entries are kept; the least recently
//!   read entry is evicted first.
//!
//! # Example
//!
//! ```
//! use refdocs_cache::{CachePolicy, SwrCache};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache: SwrCache<Vec<String>, std::io::Error> = SwrCache::new(CachePolicy::default());
//!
//! let tags = cache
//!     .fetch("remix-run/remix", || async { Ok(vec!["2.0.0".to_owned()]) })
//!     .await
//!     .unwrap();
//! assert_eq!(tags.as_slice(), ["2.0.0"]);
//!
//! // Served from cache, the loader is not called.
//! let again = cache
//!     .fetch("remix-run/remix", || async { Ok(Vec::new()) })
//!     .await
//!     .unwrap();
//! assert!(std::sync::Arc::ptr_eq(&tags, &again));
//! # }
//! ```

mod swr;

pub use swr::{FetchResult, SwrCache};

use std::time::Duration;

/// Default time-to-live of a cached entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default maximum number of cached entries.
pub const DEFAULT_CAPACITY: usize = 3;

/// Expiry and eviction policy for a [`SwrCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    /// Age after which an entry is refetched on the next read.
    pub ttl: Duration,
    /// Maximum number of entries kept.
    pub capacity: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }
}
