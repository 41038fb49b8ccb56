//! Step executor: cached, retried invocation of one resolved step.

use std::sync::Arc;
use std::time::{Duration, Instant};

use agent_tools::ToolRegistry;
use indexmap::IndexMap;
use rand::Rng;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::ChainError;

/// Default time-to-live for cached step results (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default maximum entries in the result cache before LRU eviction.
const DEFAULT_MAX_CACHE_ENTRIES: usize = 5000;

/// Retry behavior for step execution.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each retry.
    pub base_delay: Duration,
    /// Upper bound on the backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A policy with no waiting between attempts, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

struct CacheEntry {
    inserted_at: Instant,
    result: Value,
}

/// Process-wide TTL cache for step results.
///
/// Shared across all concurrently running chains; entries are immutable
/// once written except for TTL-based replacement. LRU order is kept by
/// re-inserting touched entries at the end of the map.
pub struct ResultCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<IndexMap<String, CacheEntry>>,
}

impl ResultCache {
    /// Create a cache with the given TTL and the default size cap.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_entries: DEFAULT_MAX_CACHE_ENTRIES,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    /// Look up a live entry, refreshing its LRU position.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;

        let entry = entries.shift_remove(key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            // Expired: drop rather than re-insert.
            return None;
        }

        let result = entry.result.clone();
        entries.insert(key.to_string(), entry);
        Some(result)
    }

    /// Insert or refresh an entry, evicting the oldest past the cap.
    pub async fn insert(&self, key: String, result: Value) {
        let mut entries = self.entries.lock().await;
        entries.shift_remove(&key);
        entries.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                result,
            },
        );

        while entries.len() > self.max_entries {
            entries.shift_remove_index(0);
        }
    }

    /// Number of entries currently held (live or expired).
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Canonical cache key for a resolved invocation.
///
/// Parameters are re-serialized with sorted keys so that logically equal
/// calls hash equal regardless of declaration order.
pub fn cache_key(tool: &str, function: &str, params: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();

    let mut sorted = Map::new();
    for key in keys {
        if let Some(value) = params.get(key) {
            sorted.insert(key.clone(), value.clone());
        }
    }

    format!("{}.{}|{}", tool, function, Value::Object(sorted))
}

/// Executes one resolved step with caching and bounded retries.
pub struct StepExecutor {
    registry: Arc<ToolRegistry>,
    cache: Arc<ResultCache>,
    retry: RetryPolicy,
}

impl StepExecutor {
    /// Create an executor over the given registry and shared cache.
    pub fn new(registry: Arc<ToolRegistry>, cache: Arc<ResultCache>, retry: RetryPolicy) -> Self {
        Self {
            registry,
            cache,
            retry,
        }
    }

    /// Execute a resolved (tool, function, params) invocation.
    ///
    /// A live cache hit returns immediately without touching the tool.
    /// Otherwise the call is attempted up to `max_attempts` times with
    /// exponential backoff and jitter; the first success populates the
    /// cache, and exhaustion fails with [`ChainError::Execution`] carrying
    /// the last underlying error. Deterministic failures (unknown tool or
    /// function, bad parameters) fail on the first attempt without retrying.
    pub async fn execute(
        &self,
        tool: &str,
        function: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ChainError> {
        let key = cache_key(tool, function, params);

        if let Some(hit) = self.cache.get(&key).await {
            debug!("Cache hit for {}.{}", tool, function);
            return Ok(hit);
        }

        let mut delay = self.retry.base_delay;
        let mut attempt = 1;

        loop {
            match self.registry.call(tool, function, params.clone()).await {
                Ok(result) => {
                    self.cache.insert(key, result.clone()).await;
                    return Ok(result);
                }
                Err(e) => {
                    if !e.is_transient() || attempt >= self.retry.max_attempts {
                        return Err(ChainError::Execution {
                            tool: tool.to_string(),
                            function: function.to_string(),
                            source: e,
                        });
                    }

                    warn!(
                        "Attempt {}/{} of {}.{} failed: {}; retrying",
                        attempt, self.retry.max_attempts, tool, function, e
                    );

                    sleep(jittered(delay)).await;
                    delay = (delay * 2).min(self.retry.max_delay);
                    attempt += 1;
                }
            }
        }
    }
}

/// Apply ±50% jitter to a backoff delay.
fn jittered(delay: Duration) -> Duration {
    if delay.is_zero() {
        return delay;
    }
    let factor = rand::thread_rng().gen_range(0.5..1.5);
    delay.mul_f64(factor)
}
