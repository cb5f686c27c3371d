//! Process-wide admission gate: one cache, one limiter, built once.

use crate::cache::{CacheConfig, CacheStats, ResponseCache};
use crate::resilience::{LimiterStats, RateLimiter, RateLimiterConfig};
use crate::types::Message;
use crate::Result;
use std::time::Duration;

/// The admission-and-memoization boundary in front of an inference backend.
///
/// Constructed once at process start and shared by handle (`Arc`) with
/// every caller; there is no implicit global instance. Composition at the
/// call site is explicit: look up first, on a miss acquire admission, call
/// the backend yourself, then store the result.
///
/// ```rust
/// use ai_gate::{Gatekeeper, GatekeeperBuilder, Message};
/// use std::sync::Arc;
/// use std::time::Instant;
///
/// # tokio_test::block_on(async {
/// let gate: Arc<Gatekeeper<String>> = Arc::new(GatekeeperBuilder::new().build()?);
///
/// let chat = vec![Message::user("What is 2 + 2?")];
/// let response = match gate.lookup(&chat, "gpt-4o-mini", 0.0)? {
///     Some(cached) => cached,
///     None => {
///         gate.acquire("chat", 1).await?;
///         let started = Instant::now();
///         let fresh = "4".to_string(); // the actual backend call
///         gate.store(&chat, "gpt-4o-mini", 0.0, fresh.clone(), started.elapsed())?;
///         fresh
///     }
/// };
/// assert_eq!(response, "4");
/// # Ok::<(), ai_gate::Error>(())
/// # });
/// ```
pub struct Gatekeeper<T> {
    cache: ResponseCache<T>,
    limiter: RateLimiter,
}

impl<T: Clone> Gatekeeper<T> {
    pub fn new(cache_config: CacheConfig, limiter_config: RateLimiterConfig) -> Result<Self> {
        Ok(Self {
            cache: ResponseCache::new(cache_config)?,
            limiter: RateLimiter::new(limiter_config)?,
        })
    }

    /// See [`ResponseCache::lookup`]. Never suspends.
    pub fn lookup(&self, messages: &[Message], model: &str, temperature: f64) -> Result<Option<T>> {
        self.cache.lookup(messages, model, temperature)
    }

    /// See [`ResponseCache::store`]. Never suspends.
    pub fn store(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f64,
        response: T,
        latency: Duration,
    ) -> Result<()> {
        self.cache.store(messages, model, temperature, response, latency)
    }

    /// See [`RateLimiter::acquire`]. May sleep until admission.
    pub async fn acquire(&self, operation: &str, tokens: u32) -> Result<()> {
        self.limiter.acquire(operation, tokens).await
    }

    /// See [`RateLimiter::try_acquire`]. Never sleeps.
    pub async fn try_acquire(&self, operation: &str, tokens: u32) -> bool {
        self.limiter.try_acquire(operation, tokens).await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub async fn limiter_stats(&self) -> LimiterStats {
        self.limiter.stats().await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Reset both components' statistics. Cached entries and token levels
    /// are untouched.
    pub fn reset_stats(&self) {
        self.cache.reset_stats();
        self.limiter.reset_stats();
    }

    pub fn cache(&self) -> &ResponseCache<T> {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

/// Builder for [`Gatekeeper`].
pub struct GatekeeperBuilder {
    cache_config: CacheConfig,
    limiter_config: RateLimiterConfig,
}

impl GatekeeperBuilder {
    pub fn new() -> Self {
        Self {
            cache_config: CacheConfig::default(),
            limiter_config: RateLimiterConfig::default(),
        }
    }

    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn with_limiter_config(mut self, config: RateLimiterConfig) -> Self {
        self.limiter_config = config;
        self
    }

    pub fn build<T: Clone>(self) -> Result<Gatekeeper<T>> {
        Gatekeeper::new(self.cache_config, self.limiter_config)
    }
}

impl Default for GatekeeperBuilder {
    fn default() -> Self {
        Self::new()
    }
}
