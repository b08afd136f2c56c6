//! Repartition resolvers.
//!
//! Plain consistent hashing still moves some keys whenever membership
//! changes. A repartition resolver remembers which node a hashed routing key
//! was last sent to, so a key keeps hitting the same node (and the same sync
//! state) for as long as that node stays routable.
//!
//! The manager consults the resolver before the ring and fills it from ring
//! lookups only. Entries pointing at nodes that have since left are detected
//! and overwritten by the manager.

use lru::LruCache;
use parking_lot::Mutex;
use std::fmt;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Cache from hashed routing key to the name of the node last chosen for it.
///
/// `get` must never return a name that was not `put` for that exact key.
/// Implementations are shared by concurrent readers and synchronize
/// internally.
pub trait RepartitionResolver: Send + Sync {
    fn get(&self, key: u64) -> Option<String>;
    fn put(&self, key: u64, node_name: &str);
}

/// Resolver that never remembers anything: routing is pure consistent hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRepartitionResolver;

impl RepartitionResolver for NoopRepartitionResolver {
    fn get(&self, _key: u64) -> Option<String> {
        None
    }

    fn put(&self, _key: u64, _node_name: &str) {}
}

struct Pinned {
    node_name: String,
    pinned_at: Instant,
}

/// In-memory resolver bounded by an LRU capacity and an optional TTL.
///
/// The least recently used key is evicted once `capacity` keys are pinned.
/// With a TTL, a pin older than the TTL reads as a miss and is dropped.
pub struct SimpleRepartitionResolver {
    cache: Mutex<LruCache<u64, Pinned>>,
    ttl: Option<Duration>,
}

impl SimpleRepartitionResolver {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            ttl: None,
        }
    }

    pub fn with_ttl(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::new(capacity)
        }
    }

    /// Pinned keys, including ones whose TTL ran out but were not read since.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn expired(&self, pinned: &Pinned) -> bool {
        self.ttl
            .is_some_and(|ttl| pinned.pinned_at.elapsed() >= ttl)
    }
}

impl RepartitionResolver for SimpleRepartitionResolver {
    fn get(&self, key: u64) -> Option<String> {
        let mut cache = self.cache.lock();
        let hit = cache
            .get(&key)
            .map(|pinned| (pinned.node_name.clone(), self.expired(pinned)));

        match hit {
            Some((node_name, false)) => Some(node_name),
            Some((_, true)) => {
                cache.pop(&key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: u64, node_name: &str) {
        self.cache.lock().put(
            key,
            Pinned {
                node_name: node_name.to_owned(),
                pinned_at: Instant::now(),
            },
        );
    }
}

impl fmt::Debug for SimpleRepartitionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.lock();
        f.debug_struct("SimpleRepartitionResolver")
            .field("len", &cache.len())
            .field("capacity", &cache.cap())
            .field("ttl", &self.ttl)
            .finish()
    }
}
