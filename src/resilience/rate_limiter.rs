use crate::telemetry::RequestWindow;
use crate::{Error, ErrorContext, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::trace;

pub const DEFAULT_RATE_PER_SECOND: f64 = 2.0;
pub const DEFAULT_BURST_CAPACITY: u32 = 5;

#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Refill speed for the global scope, tokens per second.
    pub rate_per_second: f64,
    /// Maximum token pool size, shared by every scope.
    pub burst_capacity: u32,
    /// Per-operation refill overrides; operations not listed here draw
    /// from the global scope.
    pub operation_rates: HashMap<String, f64>,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            rate_per_second: DEFAULT_RATE_PER_SECOND,
            burst_capacity: DEFAULT_BURST_CAPACITY,
            operation_rates: HashMap::new(),
        }
    }
}

impl RateLimiterConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global refill rate (tokens per second)
    pub fn with_rate_per_second(mut self, rate: f64) -> Self {
        self.rate_per_second = rate;
        self
    }

    /// Set the maximum token pool size (burst capacity)
    pub fn with_burst_capacity(mut self, burst: u32) -> Self {
        self.burst_capacity = burst;
        self
    }

    /// Give `operation` its own bucket refilling at `rate` tokens per second
    pub fn with_operation_rate(mut self, operation: impl Into<String>, rate: f64) -> Self {
        self.operation_rates.insert(operation.into(), rate);
        self
    }
}

/// Read-only statistics snapshot. Token figures describe the global scope.
#[derive(Debug, Clone)]
pub struct LimiterStats {
    pub total_requests: u64,
    pub total_wait: Duration,
    /// Measured admission rate over the rolling window, requests per second.
    pub current_rate: f64,
    /// The configured global refill rate, i.e. the enforced ceiling.
    pub max_rate: f64,
    pub available_tokens: f64,
    pub burst_capacity: u32,
}

#[derive(Debug)]
struct ScopeState {
    tokens: f64,
    last_refill: Instant,
    rate: f64,
}

impl ScopeState {
    fn new(rate: f64, burst: f64) -> Self {
        Self {
            tokens: burst,
            last_refill: Instant::now(),
            rate,
        }
    }

    fn refill(&mut self, burst: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.rate).min(burst);
            self.last_refill = now;
        }
    }
}

struct StatsInner {
    total_requests: u64,
    total_wait: Duration,
    window: RequestWindow,
}

impl StatsInner {
    fn new() -> Self {
        Self {
            total_requests: 0,
            total_wait: Duration::ZERO,
            window: RequestWindow::default(),
        }
    }
}

/// Token-bucket admission controller with per-operation scopes.
///
/// One global bucket serves every operation without an override; each
/// override in [`RateLimiterConfig::operation_rates`] gets an independent
/// bucket created at construction. All buckets share the configured burst
/// capacity and refill lazily on access.
///
/// `acquire` computes the exact deficit wait under the scope lock, releases
/// the lock before sleeping, and re-validates from scratch after waking:
/// other callers may have drained the bucket in the interim, and waiting on
/// one scope never delays callers on another. A caller cancelled mid-wait
/// has consumed no tokens and recorded no request.
pub struct RateLimiter {
    config: RateLimiterConfig,
    global: Arc<Mutex<ScopeState>>,
    scopes: HashMap<String, Arc<Mutex<ScopeState>>>,
    stats: std::sync::Mutex<StatsInner>,
}

impl RateLimiter {
    /// Build a limiter, rejecting any configuration that would make
    /// `acquire` unsatisfiable: a zero, negative, or non-finite rate
    /// (global or override) and a zero burst are configuration errors
    /// here, never an infinite wait or a division by zero later.
    pub fn new(config: RateLimiterConfig) -> Result<Self> {
        validate_rate(config.rate_per_second, "limiter.rate_per_second")?;
        for (operation, rate) in &config.operation_rates {
            validate_rate(*rate, &format!("limiter.operation_rates.{}", operation))?;
        }
        if config.burst_capacity == 0 {
            return Err(Error::configuration_with_context(
                "burst capacity must be at least 1 token",
                ErrorContext::new()
                    .with_field_path("limiter.burst_capacity")
                    .with_details("got 0")
                    .with_source("rate_limiter"),
            ));
        }

        let burst = config.burst_capacity as f64;
        let global = Arc::new(Mutex::new(ScopeState::new(config.rate_per_second, burst)));
        let scopes = config
            .operation_rates
            .iter()
            .map(|(operation, rate)| {
                (
                    operation.clone(),
                    Arc::new(Mutex::new(ScopeState::new(*rate, burst))),
                )
            })
            .collect();
        Ok(Self {
            config,
            global,
            scopes,
            stats: std::sync::Mutex::new(StatsInner::new()),
        })
    }

    /// Acquire `tokens` admission tokens for `operation`, sleeping as long
    /// as needed. Zero tokens succeed immediately without touching the
    /// bucket or the statistics. Requests larger than the burst capacity
    /// are rejected because no amount of waiting could satisfy them.
    pub async fn acquire(&self, operation: &str, tokens: u32) -> Result<()> {
        if tokens == 0 {
            return Ok(());
        }
        let requested = tokens as f64;
        let burst = self.config.burst_capacity as f64;
        if requested > burst {
            return Err(Error::validation_with_context(
                format!(
                    "requested {} tokens but burst capacity is {}",
                    tokens, self.config.burst_capacity
                ),
                ErrorContext::new()
                    .with_field_path("acquire.tokens")
                    .with_source("rate_limiter"),
            ));
        }

        let scope = self.scope_for(operation);
        let mut waited = Duration::ZERO;
        loop {
            // Hold the scope lock only to refill and decide; never across
            // the sleep, or every caller on this scope would serialize
            // behind the longest wait.
            let deficit_wait = {
                let mut state = scope.lock().await;
                state.refill(burst);
                if state.tokens >= requested {
                    state.tokens -= requested;
                    None
                } else {
                    Some(Duration::from_secs_f64(
                        (requested - state.tokens) / state.rate,
                    ))
                }
            };
            match deficit_wait {
                None => {
                    self.record_admission(waited);
                    return Ok(());
                }
                Some(wait) => {
                    trace!(
                        operation,
                        wait_ms = wait.as_millis() as u64,
                        "insufficient tokens, waiting for refill"
                    );
                    tokio::time::sleep(wait).await;
                    waited += wait;
                }
            }
        }
    }

    /// Consume `tokens` for `operation` if immediately available.
    ///
    /// Never sleeps. Returns `false` when the bucket is short, including
    /// requests larger than the burst capacity, which can never succeed.
    pub async fn try_acquire(&self, operation: &str, tokens: u32) -> bool {
        if tokens == 0 {
            return true;
        }
        let requested = tokens as f64;
        let burst = self.config.burst_capacity as f64;
        if requested > burst {
            return false;
        }
        let scope = self.scope_for(operation);
        let admitted = {
            let mut state = scope.lock().await;
            state.refill(burst);
            if state.tokens >= requested {
                state.tokens -= requested;
                true
            } else {
                false
            }
        };
        if admitted {
            self.record_admission(Duration::ZERO);
        }
        admitted
    }

    /// Measured admission rate over the rolling window, requests per
    /// second; 0.0 until two admissions have been observed.
    pub fn current_rate(&self) -> f64 {
        self.stats.lock().map(|s| s.window.rate()).unwrap_or(0.0)
    }

    pub async fn stats(&self) -> LimiterStats {
        let available_tokens = {
            let mut state = self.global.lock().await;
            state.refill(self.config.burst_capacity as f64);
            state.tokens
        };
        let (total_requests, total_wait, current_rate) = self
            .stats
            .lock()
            .map(|s| (s.total_requests, s.total_wait, s.window.rate()))
            .unwrap_or((0, Duration::ZERO, 0.0));
        LimiterStats {
            total_requests,
            total_wait,
            current_rate,
            max_rate: self.config.rate_per_second,
            available_tokens,
            burst_capacity: self.config.burst_capacity,
        }
    }

    /// Zero the counters, wait total, and request window. Token levels in
    /// every scope are untouched.
    pub fn reset_stats(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            *stats = StatsInner::new();
        }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    fn scope_for(&self, operation: &str) -> Arc<Mutex<ScopeState>> {
        self.scopes
            .get(operation)
            .unwrap_or(&self.global)
            .clone()
    }

    fn record_admission(&self, waited: Duration) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.total_requests += 1;
            stats.total_wait += waited;
            stats.window.record();
        }
    }
}

fn validate_rate(rate: f64, field: &str) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(Error::configuration_with_context(
            "refill rate must be a positive, finite number of tokens per second",
            ErrorContext::new()
                .with_field_path(field)
                .with_details(format!("got {}", rate))
                .with_source("rate_limiter"),
        ));
    }
    Ok(())
}
