//! 响应缓存模块：以请求指纹为键的响应记忆化，避免重复调用后端。
//!
//! # Response Memoization Module
//!
//! This module avoids redundant recomputation of identical, low-randomness
//! requests: responses are memoized under a deterministic fingerprint of
//! the request payload, bounded both in size (LRU eviction) and in time
//! (TTL expiry).
//!
//! ## Overview
//!
//! Memoization is valuable for:
//! - Reducing backend load by short-circuiting repeated requests
//! - Improving response latency for repeated queries
//! - Quantifying how much backend time caching saves (saved-latency stats)
//!
//! Requests sampled above the determinism temperature ceiling are presumed
//! non-reproducible and bypass the cache in both directions.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ResponseCache`] | Bounded store with TTL expiry, LRU eviction, and statistics |
//! | [`CacheConfig`] | Capacity, TTL, temperature ceiling, key salt |
//! | [`CacheKey`] | Fingerprint digest used as the store key |
//! | [`CacheKeyGenerator`] | Canonical-serialization SHA-256 fingerprinting |
//! | [`CacheStats`] | Read-only hit/miss/saved-time snapshot |
//!
//! ## Example
//!
//! ```rust
//! use ai_gate::cache::{CacheConfig, ResponseCache};
//! use ai_gate::types::Message;
//! use std::time::Duration;
//!
//! let cache: ResponseCache<String> = ResponseCache::new(
//!     CacheConfig::new()
//!         .with_max_entries(500)
//!         .with_ttl(Duration::from_secs(600)),
//! )?;
//!
//! let chat = vec![Message::user("ping")];
//! if cache.lookup(&chat, "gpt-4o-mini", 0.0)?.is_none() {
//!     // ... call the backend, measure its latency ...
//!     cache.store(&chat, "gpt-4o-mini", 0.0, "pong".into(), Duration::from_millis(900))?;
//! }
//! # Ok::<(), ai_gate::Error>(())
//! ```

mod key;
mod store;

pub use key::{CacheKey, CacheKeyGenerator};
pub use store::{
    CacheConfig, CacheStats, ResponseCache, DEFAULT_MAX_ENTRIES, DEFAULT_TEMPERATURE_CEILING,
    DEFAULT_TTL,
};
