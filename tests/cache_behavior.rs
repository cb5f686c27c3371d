//! Behavioral tests for the response cache through the public surface.

use ai_gate::{CacheConfig, Error, Message, ResponseCache};
use std::sync::Arc;
use std::time::Duration;

fn prompt(text: &str) -> Vec<Message> {
    vec![
        Message::system("You are a helpful assistant"),
        Message::user(text),
    ]
}

fn cache_with(config: CacheConfig) -> ResponseCache<String> {
    ResponseCache::new(config).expect("valid config")
}

#[test]
fn store_then_lookup_returns_exact_response() {
    let cache = cache_with(CacheConfig::new());
    cache
        .store(
            &prompt("capital of France?"),
            "gpt-4o-mini",
            0.2,
            "Paris".to_string(),
            Duration::from_millis(800),
        )
        .unwrap();

    let hit = cache.lookup(&prompt("capital of France?"), "gpt-4o-mini", 0.2).unwrap();
    assert_eq!(hit.as_deref(), Some("Paris"));
}

#[test]
fn high_temperature_store_then_lookup_always_misses() {
    let cache = cache_with(CacheConfig::new());
    cache
        .store(&prompt("surprise me"), "gpt-4o-mini", 0.9, "anything".to_string(), Duration::ZERO)
        .unwrap();

    assert!(cache
        .lookup(&prompt("surprise me"), "gpt-4o-mini", 0.9)
        .unwrap()
        .is_none());

    let stats = cache.stats();
    assert_eq!(stats.current_size, 0);
    assert_eq!(stats.misses, 1);
}

#[test]
fn overridden_temperature_ceiling_is_honored() {
    let cache = cache_with(CacheConfig::new().with_temperature_ceiling(1.0));
    cache
        .store(&prompt("still cached"), "m", 0.9, "yes".to_string(), Duration::ZERO)
        .unwrap();
    assert_eq!(
        cache.lookup(&prompt("still cached"), "m", 0.9).unwrap().as_deref(),
        Some("yes")
    );
}

#[test]
fn entries_expire_after_ttl() {
    let cache = cache_with(CacheConfig::new().with_ttl(Duration::from_millis(100)));
    cache
        .store(&prompt("ephemeral"), "m", 0.0, "v".to_string(), Duration::ZERO)
        .unwrap();

    assert!(cache.lookup(&prompt("ephemeral"), "m", 0.0).unwrap().is_some());
    std::thread::sleep(Duration::from_millis(150));
    assert!(cache.lookup(&prompt("ephemeral"), "m", 0.0).unwrap().is_none());
}

#[test]
fn capacity_is_bounded() {
    let max = 8;
    let cache = cache_with(CacheConfig::new().with_max_entries(max));
    for i in 0..=max {
        cache
            .store(&prompt(&format!("q{i}")), "m", 0.0, format!("a{i}"), Duration::ZERO)
            .unwrap();
    }
    assert!(cache.stats().current_size <= max);
}

#[test]
fn hit_rate_after_one_miss_one_hit() {
    let cache = cache_with(CacheConfig::new());
    assert!(cache.lookup(&prompt("q"), "m", 0.0).unwrap().is_none());
    cache
        .store(&prompt("q"), "m", 0.0, "a".to_string(), Duration::from_millis(500))
        .unwrap();
    assert!(cache.lookup(&prompt("q"), "m", 0.0).unwrap().is_some());

    let stats = cache.stats();
    assert_eq!(stats.total_requests, 2);
    assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    assert_eq!(stats.total_saved_latency, Duration::from_millis(500));
}

#[test]
fn reset_stats_leaves_entries_resident() {
    let cache = cache_with(CacheConfig::new());
    cache
        .store(&prompt("kept"), "m", 0.0, "v".to_string(), Duration::ZERO)
        .unwrap();
    cache.lookup(&prompt("kept"), "m", 0.0).unwrap();

    cache.reset_stats();
    assert_eq!(cache.stats().total_requests, 0);
    assert_eq!(cache.stats().current_size, 1);
}

#[test]
fn clear_leaves_stats_intact() {
    let cache = cache_with(CacheConfig::new());
    cache.lookup(&prompt("missing"), "m", 0.0).unwrap();
    cache.clear();
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn fingerprint_failure_surfaces_instead_of_masking_as_miss() {
    let cache = cache_with(CacheConfig::new());
    // NaN is below any finite ceiling comparison, so the bypass does not
    // swallow it; the fingerprint rejects it loudly.
    let result = cache.lookup(&prompt("q"), "m", f64::NAN);
    assert!(matches!(result, Err(Error::Validation { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_traffic_keeps_counters_consistent() {
    let cache = Arc::new(cache_with(CacheConfig::new().with_max_entries(64)));

    let mut handles = Vec::new();
    for task in 0..8u32 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            for i in 0..25u32 {
                let messages = prompt(&format!("q{}", i % 5));
                if cache.lookup(&messages, "m", 0.0).unwrap().is_none() {
                    cache
                        .store(&messages, "m", 0.0, format!("t{task}-a{i}"), Duration::ZERO)
                        .unwrap();
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = cache.stats();
    assert_eq!(stats.total_requests, 8 * 25);
    assert_eq!(stats.hits + stats.misses, stats.total_requests);
    // only 5 distinct prompts were ever stored
    assert!(stats.current_size <= 5);
}
