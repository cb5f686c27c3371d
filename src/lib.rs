//! # ai-gate
//!
//! 这是位于聊天客户端与慢速推理后端之间的准入控制与响应记忆化层。
//!
//! A request-admission and response-memoization layer that sits between a
//! chat client and a slow, stateful inference backend: admission control
//! prevents overload, memoization avoids redundant recomputation of
//! identical, low-randomness requests.
//!
//! ## Overview
//!
//! The control flow at a call site is explicit: probe the cache first; on
//! a hit return immediately with no admission check; on a miss acquire
//! admission (which may sleep), perform the backend call yourself, then
//! store the result with its measured latency.
//!
//! ## Core Philosophy
//!
//! - **Explicit resources**: the [`Gatekeeper`] is constructed once at
//!   process start and passed by handle; no lazy global state
//! - **Opaque payloads**: cached responses are type parameters, cloned out
//!   on hits and never introspected
//! - **Errors are narrow**: misses, expired entries, and empty buckets are
//!   ordinary results; only misconfiguration, misuse, and serialization
//!   failures are errors
//! - **Never sleep holding a lock**: admission waits are computed under a
//!   scope lock, slept without it, and re-validated after waking
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_gate::{CacheConfig, Gatekeeper, GatekeeperBuilder, Message, RateLimiterConfig};
//! use std::time::{Duration, Instant};
//!
//! #[tokio::main]
//! async fn main() -> ai_gate::Result<()> {
//!     let gate: Gatekeeper<String> = GatekeeperBuilder::new()
//!         .with_cache_config(CacheConfig::new().with_ttl(Duration::from_secs(600)))
//!         .with_limiter_config(
//!             RateLimiterConfig::new()
//!                 .with_rate_per_second(5.0)
//!                 .with_operation_rate("embed", 50.0),
//!         )
//!         .build()?;
//!
//!     let chat = vec![Message::user("Hello, how are you?")];
//!     if let Some(cached) = gate.lookup(&chat, "gpt-4o-mini", 0.2)? {
//!         println!("{cached}");
//!         return Ok(());
//!     }
//!
//!     gate.acquire("chat", 1).await?;
//!     let started = Instant::now();
//!     let response = call_backend(&chat).await; // your transport layer
//!     gate.store(&chat, "gpt-4o-mini", 0.2, response, started.elapsed())?;
//!     Ok(())
//! }
//! # async fn call_backend(_: &[ai_gate::Message]) -> String { String::new() }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Fingerprint-keyed response memoization with TTL and LRU bounds |
//! | [`resilience`] | Token-bucket admission control with per-operation scopes |
//! | [`telemetry`] | Rolling-window statistics shared by both components |
//! | [`types`] | Request payload types the fingerprint is derived from |
//! | [`gate`] | The [`Gatekeeper`] facade bundling one cache and one limiter |

pub mod cache;
pub mod gate;
pub mod resilience;
pub mod telemetry;
pub mod types;

// Re-export main types for convenience
pub use cache::{CacheConfig, CacheKey, CacheKeyGenerator, CacheStats, ResponseCache};
pub use gate::{Gatekeeper, GatekeeperBuilder};
pub use resilience::{LimiterStats, RateLimiter, RateLimiterConfig};
pub use types::{Message, MessageRole};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
