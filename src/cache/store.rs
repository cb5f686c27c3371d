//! Bounded in-memory response store with TTL expiry and LRU eviction.

use super::key::CacheKeyGenerator;
use crate::telemetry::RequestWindow;
use crate::types::Message;
use crate::{Error, ErrorContext, Result};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Sampling temperatures above this are presumed non-reproducible and
/// bypass the cache entirely.
pub const DEFAULT_TEMPERATURE_CEILING: f64 = 0.5;

pub const DEFAULT_MAX_ENTRIES: usize = 100;
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum resident entries; least-recently-used beyond this are evicted.
    pub max_entries: usize,
    /// Entries older than this are treated as absent on lookup.
    pub ttl: Duration,
    /// Determinism threshold: requests sampled hotter than this skip the cache.
    pub temperature_ceiling: f64,
    /// Optional namespace salt mixed into every fingerprint.
    pub key_salt: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
            temperature_ceiling: DEFAULT_TEMPERATURE_CEILING,
            key_salt: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_temperature_ceiling(mut self, ceiling: f64) -> Self {
        self.temperature_ceiling = ceiling;
        self
    }

    pub fn with_key_salt(mut self, salt: impl Into<String>) -> Self {
        self.key_salt = Some(salt.into());
        self
    }
}

/// Read-only statistics snapshot.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    pub hit_rate: f64,
    pub current_size: usize,
    pub max_size: usize,
    pub total_saved_latency: Duration,
    /// Lookup traffic over the rolling window, requests per second.
    pub request_rate: f64,
}

struct CacheEntry<T> {
    response: T,
    /// How long the backend took to compute the response; credited to
    /// saved-time statistics on every hit.
    latency: Duration,
    created_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

struct StatsInner {
    hits: u64,
    misses: u64,
    saved_latency: Duration,
    window: RequestWindow,
}

impl StatsInner {
    fn new() -> Self {
        Self {
            hits: 0,
            misses: 0,
            saved_latency: Duration::ZERO,
            window: RequestWindow::default(),
        }
    }
}

/// Response memoization store keyed by request fingerprint.
///
/// The cached value is opaque: `T` is cloned out on hits and never
/// inspected. Entries are immutable once stored; a `store` under an
/// existing key replaces the entry wholesale. Expiry is lazy: an entry
/// past its TTL is dropped when a lookup touches it.
///
/// `lookup` and `store` never suspend, so the store is shared freely
/// between async tasks behind an `Arc`.
pub struct ResponseCache<T> {
    config: CacheConfig,
    keygen: CacheKeyGenerator,
    entries: Mutex<LruCache<String, CacheEntry<T>>>,
    stats: Mutex<StatsInner>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(config: CacheConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.max_entries).ok_or_else(|| {
            Error::configuration_with_context(
                "cache capacity must be at least 1 entry",
                ErrorContext::new()
                    .with_field_path("cache.max_entries")
                    .with_details("got 0")
                    .with_source("response_cache"),
            )
        })?;
        if !config.temperature_ceiling.is_finite() {
            return Err(Error::configuration_with_context(
                "temperature ceiling must be a finite number",
                ErrorContext::new()
                    .with_field_path("cache.temperature_ceiling")
                    .with_source("response_cache"),
            ));
        }
        let mut keygen = CacheKeyGenerator::new();
        if let Some(ref salt) = config.key_salt {
            keygen = keygen.with_salt(salt.clone());
        }
        Ok(Self {
            config,
            keygen,
            entries: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(StatsInner::new()),
        })
    }

    /// Probe the store for a previously computed response.
    ///
    /// Returns `Ok(None)` on miss, expired entry, or high-temperature
    /// bypass; the only error is a fingerprint serialization failure,
    /// which is surfaced rather than masked as a miss.
    pub fn lookup(&self, messages: &[Message], model: &str, temperature: f64) -> Result<Option<T>> {
        if temperature > self.config.temperature_ceiling {
            trace!(temperature, model, "temperature above ceiling, bypassing cache");
            self.record_miss();
            return Ok(None);
        }
        let key = self.keygen.generate(messages, model, temperature)?;

        let found = {
            let mut entries = self.lock_entries()?;
            match entries.get(&key.hash) {
                Some(entry) if entry.is_expired(self.config.ttl) => {
                    debug!(key = %key, "cache entry expired, dropping");
                    entries.pop(&key.hash);
                    None
                }
                Some(entry) => Some((entry.response.clone(), entry.latency)),
                None => None,
            }
        };

        match found {
            Some((response, latency)) => {
                debug!(key = %key, model, "cache hit");
                self.record_hit(latency);
                Ok(Some(response))
            }
            None => {
                self.record_miss();
                Ok(None)
            }
        }
    }

    /// Memoize a freshly computed response together with its measured
    /// backend latency. High-temperature requests are silently not cached.
    pub fn store(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f64,
        response: T,
        latency: Duration,
    ) -> Result<()> {
        if temperature > self.config.temperature_ceiling {
            trace!(temperature, model, "temperature above ceiling, not caching");
            return Ok(());
        }
        let key = self.keygen.generate(messages, model, temperature)?;
        let entry = CacheEntry {
            response,
            latency,
            created_at: Instant::now(),
        };
        let mut entries = self.lock_entries()?;
        if let Some((evicted, _)) = entries.push(key.hash.clone(), entry) {
            if evicted != key.hash {
                debug!(key = %evicted, "evicted least-recently-used entry");
            }
        }
        Ok(())
    }

    /// Drop every entry. Statistics are untouched.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Zero the hit/miss/saved-latency counters and the request window.
    /// Stored entries are untouched.
    pub fn reset_stats(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            *stats = StatsInner::new();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let current_size = self
            .entries
            .lock()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, e)| !e.is_expired(self.config.ttl))
                    .count()
            })
            .unwrap_or(0);
        let (hits, misses, saved_latency, request_rate) = self
            .stats
            .lock()
            .map(|s| (s.hits, s.misses, s.saved_latency, s.window.rate()))
            .unwrap_or((0, 0, Duration::ZERO, 0.0));
        let total_requests = hits + misses;
        let hit_rate = if total_requests > 0 {
            hits as f64 / total_requests as f64
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            total_requests,
            hit_rate,
            current_size,
            max_size: self.config.max_entries,
            total_saved_latency: saved_latency,
            request_rate,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn record_hit(&self, latency: Duration) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.hits += 1;
            stats.saved_latency += latency;
            stats.window.record();
        }
    }

    fn record_miss(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.misses += 1;
            stats.window.record();
        }
    }

    fn lock_entries(&self) -> Result<std::sync::MutexGuard<'_, LruCache<String, CacheEntry<T>>>> {
        self.entries.lock().map_err(|_| {
            Error::runtime_with_context(
                "cache store poisoned",
                ErrorContext::new().with_source("response_cache"),
            )
        })
    }
}
