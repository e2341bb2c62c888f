//! Owner-bound plaintext cache with time-based expiry.
//!
//! Entries are keyed by `SHA-256(len(raw) || raw || user_id)` and remember the
//! user that created them. A lookup only hits for that same user and only
//! before the TTL elapses; anything else is a miss and the entry is dropped.
//! Plaintext is zeroized whenever an entry leaves the map.
//!
//! A background task sweeps expired entries on a fixed interval. The cache
//! owns that task: [`DecryptionCache::start`] spawns it, [`DecryptionCache::stop`]
//! or dropping the cache aborts it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::config::{DEFAULT_CACHE_TTL_SECS, DEFAULT_SWEEP_INTERVAL_SECS};

/// Hash of (envelope string, user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn new(raw: &str, user_id: &str) -> Self {
        let mut hasher = Sha256::new();
        // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
        hasher.update((raw.len() as u64).to_be_bytes());
        hasher.update(raw.as_bytes());
        hasher.update(user_id.as_bytes());
        Self(hasher.finalize().into())
    }
}

struct CacheEntry {
    plaintext: Zeroizing<String>,
    created_at: Instant,
    owner_user_id: String,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct DecryptionCache {
    ttl: Duration,
    sweep_interval: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl DecryptionCache {
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            ttl,
            sweep_interval,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sweeper: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached plaintext if `user_id` owns the entry and it has not
    /// expired. Expired or foreign entries are evicted.
    pub fn get(&self, key: &CacheKey, user_id: &str) -> Option<Zeroizing<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let usable = match entries.get(key) {
            None => None,
            Some(entry) if entry.owner_user_id != user_id => {
                warn!("cache entry owner mismatch; evicting");
                Some(false)
            }
            Some(entry) if entry.is_expired(now, self.ttl) => {
                debug!("cache entry expired; evicting");
                Some(false)
            }
            Some(_) => Some(true),
        };

        match usable {
            Some(true) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                entries.get(key).map(|entry| entry.plaintext.clone())
            }
            Some(false) => {
                entries.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a plaintext for `user_id`, replacing any previous entry.
    pub fn put(&self, key: CacheKey, user_id: &str, plaintext: &str) {
        let entry = CacheEntry {
            plaintext: Zeroizing::new(plaintext.to_string()),
            created_at: Instant::now(),
            owner_user_id: user_id.to_string(),
        };
        self.entries.lock().insert(key, entry);
    }

    /// Drop every expired entry. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        let removed = before - entries.len();
        if removed > 0 {
            info!(removed, remaining = entries.len(), "swept expired cache entries");
        }
        removed
    }

    /// Drop every entry owned by `user_id`. Returns the number removed.
    pub fn invalidate_user(&self, user_id: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.owner_user_id != user_id);
        before - entries.len()
    }

    /// Drop everything, e.g. on logout.
    pub fn clear_all(&self) {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        debug!(removed, "cleared decryption cache");
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Spawn the periodic sweep on the current tokio runtime.
    ///
    /// Idempotent. Returns false when called outside a runtime, in which case
    /// expired entries are still evicted lazily on lookup.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut sweeper = self.sweeper.lock();
        if sweeper.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return true;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("no tokio runtime; cache sweep not started");
                return false;
            }
        };

        // Weak so an abandoned cache is not kept alive by its own sweeper.
        let cache = Arc::downgrade(self);
        let period = self.sweep_interval;
        *sweeper = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                cache.sweep();
            }
        }));
        debug!(interval_secs = period.as_secs(), "cache sweep started");
        true
    }

    /// Abort the sweep task, if running.
    pub fn stop(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
            debug!("cache sweep stopped");
        }
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Default for DecryptionCache {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        )
    }
}

impl Drop for DecryptionCache {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);
    const SWEEP: Duration = Duration::from_secs(60);

    fn cache() -> DecryptionCache {
        DecryptionCache::new(TTL, SWEEP)
    }

    #[test]
    fn key_depends_on_raw_and_user() {
        let a = CacheKey::new("v2:a:b:c:d", "user-a");
        assert_eq!(a, CacheKey::new("v2:a:b:c:d", "user-a"));
        assert_ne!(a, CacheKey::new("v2:a:b:c:d", "user-b"));
        assert_ne!(a, CacheKey::new("v2:a:b:c:e", "user-a"));
        assert_ne!(CacheKey::new("ab", "c"), CacheKey::new("a", "bc"));
    }

    #[tokio::test(start_paused = true)]
    async fn hit_for_owner() {
        let cache = cache();
        let key = CacheKey::new("raw", "user-a");
        cache.put(key, "user-a", "sk_live_demo");

        let hit = cache.get(&key, "user-a").unwrap();
        assert_eq!(hit.as_str(), "sk_live_demo");
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn foreign_owner_is_miss_and_evicts() {
        let cache = cache();
        let key = CacheKey::new("raw", "user-a");
        cache.put(key, "user-a", "secret");

        assert!(cache.get(&key, "user-b").is_none());
        assert!(cache.is_empty());
        assert!(cache.get(&key, "user-a").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_miss_and_evicts() {
        let cache = cache();
        let key = CacheKey::new("raw", "user-a");
        cache.put(key, "user-a", "secret");

        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        assert!(cache.get(&key, "user-a").is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&key, "user-a").is_none());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_expired() {
        let cache = cache();
        cache.put(CacheKey::new("old", "u"), "u", "old");
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.put(CacheKey::new("new", "u"), "u", "new");
        tokio::time::advance(Duration::from_secs(100)).await;

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&CacheKey::new("new", "u"), "u").is_some());
    }

    #[test]
    fn invalidate_user_and_clear_all() {
        let cache = cache();
        cache.put(CacheKey::new("1", "a"), "a", "x");
        cache.put(CacheKey::new("2", "a"), "a", "y");
        cache.put(CacheKey::new("3", "b"), "b", "z");

        assert_eq!(cache.invalidate_user("a"), 2);
        assert_eq!(cache.len(), 1);

        cache.clear_all();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().size, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn background_sweep_runs_on_interval() {
        let cache = Arc::new(cache());
        assert!(cache.start());
        assert!(cache.is_sweeping());
        cache.put(CacheKey::new("raw", "u"), "u", "secret");

        // Sweeps tick every 60s; the one at 300s is the first to see it expired.
        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(cache.len(), 1);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(cache.len(), 0);

        cache.stop();
        assert!(!cache.is_sweeping());
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let cache = Arc::new(cache());
        assert!(cache.start());
        assert!(cache.start());
        cache.stop();
        cache.stop();
        assert!(!cache.is_sweeping());
    }

    #[test]
    fn start_outside_runtime_is_refused() {
        let cache = Arc::new(cache());
        assert!(!cache.start());
        assert!(!cache.is_sweeping());
    }
}
