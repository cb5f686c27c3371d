//! 弹性模块：通过令牌桶准入控制保护慢速推理后端不被压垮。
//!
//! # Admission Control Module
//!
//! This module protects a slow, limited-concurrency inference backend from
//! overload: every request must acquire admission from a token-bucket
//! limiter before reaching the backend.
//!
//! ## Overview
//!
//! Admission control is essential for production AI systems to:
//! - Keep request throughput inside the backend's concurrency headroom
//! - Give latency-sensitive operations their own budget via per-operation
//!   rate overrides
//! - Let batch callers choose between waiting ([`RateLimiter::acquire`])
//!   and failing fast ([`RateLimiter::try_acquire`])
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RateLimiter`] | Token bucket limiter with global and per-operation scopes |
//! | [`RateLimiterConfig`] | Rates, burst capacity, override table |
//! | [`LimiterStats`] | Read-only counters and rate estimates |
//!
//! ## Example
//!
//! ```rust
//! use ai_gate::resilience::{RateLimiter, RateLimiterConfig};
//!
//! # tokio_test::block_on(async {
//! let limiter = RateLimiter::new(
//!     RateLimiterConfig::new()
//!         .with_rate_per_second(10.0)
//!         .with_burst_capacity(20)
//!         .with_operation_rate("embed", 50.0),
//! )?;
//!
//! // Blocks until a token is available
//! limiter.acquire("chat", 1).await?;
//!
//! // Fails fast instead of waiting
//! if limiter.try_acquire("embed", 1).await {
//!     // proceed with the backend call
//! }
//! # Ok::<(), ai_gate::Error>(())
//! # });
//! ```

pub mod rate_limiter;

pub use rate_limiter::{
    LimiterStats, RateLimiter, RateLimiterConfig, DEFAULT_BURST_CAPACITY, DEFAULT_RATE_PER_SECOND,
};
