// Correlation Manager
// Links a receive step to the value produced by an earlier send step, waiting up to a timeout

use crate::config::CorrelationConfig;
use crate::context::{UnknownVariableError, VariableScope};
use crate::correlation::store::{InMemoryObjectStore, ObjectStore};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Prefix of conventional correlation key aliases
pub const CORRELATION_KEY_PREFIX: &str = "stepcheck_correlation_key_";

/// Conventional alias under which a consumer's correlation key is saved
pub fn correlation_key_name(consumer: &str) -> String {
    format!("{}{}", CORRELATION_KEY_PREFIX, consumer)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    #[error("Correlation key alias was never saved in this scope: {0}")]
    UnknownVariable(#[from] UnknownVariableError),

    #[error("No value for correlation key '{key}' within {}ms", .timeout.as_millis())]
    Timeout { key: String, timeout: Duration },
}

/// Correlation manager over a swappable object store.
///
/// Clones share the same store, so a send task and a receive task can each
/// hold one.
pub struct CorrelationManager<T: Send + 'static> {
    store: Arc<dyn ObjectStore<T>>,
    poll_interval: Duration,
    default_timeout: Duration,
}

impl<T: Send + 'static> CorrelationManager<T> {
    /// Manager with default settings and an unbounded in-memory store
    pub fn new() -> Self {
        Self::from_config(&CorrelationConfig::default())
    }

    pub fn from_config(config: &CorrelationConfig) -> Self {
        let store = match config.capacity {
            Some(capacity) => InMemoryObjectStore::with_capacity_limit(capacity),
            None => InMemoryObjectStore::new(),
        };

        Self {
            store: Arc::new(store),
            poll_interval: config.poll_interval(),
            default_timeout: config.default_timeout(),
        }
    }

    pub fn with_object_store(mut self, store: Arc<dyn ObjectStore<T>>) -> Self {
        self.store = store;
        self
    }

    pub fn set_object_store(&mut self, store: Arc<dyn ObjectStore<T>>) {
        self.store = store;
    }

    pub fn object_store(&self) -> Arc<dyn ObjectStore<T>> {
        Arc::clone(&self.store)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Save `correlation_key` in the caller's scope under `alias` (last write wins)
    pub fn save_correlation_key(
        &self,
        alias: &str,
        correlation_key: &str,
        scope: &mut dyn VariableScope,
    ) {
        tracing::debug!(alias, key = correlation_key, "saving correlation key");
        scope.set_variable(alias, correlation_key.to_string());
    }

    /// Look up the correlation key previously saved under `alias`
    pub fn get_correlation_key(
        &self,
        alias: &str,
        scope: &dyn VariableScope,
    ) -> Result<String, CorrelationError> {
        Ok(scope.get_variable(alias)?)
    }

    /// Store `value` for `correlation_key`, replacing any earlier value
    pub async fn store(&self, correlation_key: &str, value: T) {
        tracing::debug!(key = correlation_key, "storing correlated value");
        self.store.add(correlation_key, value).await;
    }

    /// Wait until a value for `correlation_key` is stored, then consume it.
    ///
    /// The store is re-checked every poll interval (never past the deadline).
    /// Each stored value is handed to at most one caller.
    pub async fn find(&self, correlation_key: &str, timeout: Duration) -> Result<T, CorrelationError> {
        // None: the timeout is too large to represent, wait without a deadline
        let deadline = Instant::now().checked_add(timeout);

        loop {
            if let Some(value) = self.store.remove(correlation_key).await {
                tracing::debug!(key = correlation_key, "found correlated value");
                return Ok(value);
            }

            let now = Instant::now();
            let Some(deadline) = deadline else {
                tokio::time::sleep(self.poll_interval).await;
                continue;
            };
            if now >= deadline {
                tracing::warn!(
                    key = correlation_key,
                    timeout_ms = timeout.as_millis() as u64,
                    "correlation lookup timed out"
                );
                return Err(CorrelationError::Timeout {
                    key: correlation_key.to_string(),
                    timeout,
                });
            }

            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// `find` with the configured default timeout
    pub async fn find_default(&self, correlation_key: &str) -> Result<T, CorrelationError> {
        self.find(correlation_key, self.default_timeout).await
    }

    /// Consume the value for `correlation_key` if it is already stored
    pub async fn try_find(&self, correlation_key: &str) -> Option<T> {
        self.store.remove(correlation_key).await
    }
}

impl<T: Send + 'static> Default for CorrelationManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Clone for CorrelationManager<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            poll_interval: self.poll_interval,
            default_timeout: self.default_timeout,
        }
    }
}

impl<T: Send + 'static> fmt::Debug for CorrelationManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationManager")
            .field("poll_interval", &self.poll_interval)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_correlation_key_name() {
        assert_eq!(
            correlation_key_name("orderClient"),
            "stepcheck_correlation_key_orderClient"
        );
    }

    #[test]
    fn test_save_and_get_correlation_key() {
        let manager: CorrelationManager<String> = CorrelationManager::new();
        let mut ctx = TestContext::new();
        let alias = correlation_key_name("client");

        manager.save_correlation_key(&alias, "corr-1", &mut ctx);
        assert_eq!(manager.get_correlation_key(&alias, &ctx).unwrap(), "corr-1");

        manager.save_correlation_key(&alias, "corr-2", &mut ctx);
        assert_eq!(manager.get_correlation_key(&alias, &ctx).unwrap(), "corr-2");
    }

    #[test]
    fn test_get_unknown_alias() {
        let manager: CorrelationManager<String> = CorrelationManager::new();
        let err = manager
            .get_correlation_key("missingAlias", &TestContext::new())
            .unwrap_err();

        assert_eq!(
            err,
            CorrelationError::UnknownVariable(UnknownVariableError::new("missingAlias"))
        );
        assert!(err.to_string().contains("missingAlias"));
    }

    #[tokio::test]
    async fn test_find_already_stored() {
        let manager = CorrelationManager::new();
        manager.store("corr-1", "resp-body".to_string()).await;

        let started = Instant::now();
        let value = manager.find("corr-1", Duration::from_millis(1000)).await.unwrap();
        assert_eq!(value, "resp-body");
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_find_waits_for_later_store() {
        let manager = CorrelationManager::new();
        let sender = manager.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            sender.store("corr-2", 42u32).await;
        });

        let started = Instant::now();
        let value = manager.find("corr-2", Duration::from_secs(1)).await.unwrap();
        assert_eq!(value, 42);

        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(120));
        assert!(waited <= Duration::from_millis(120) + manager.poll_interval());
    }

    #[tokio::test(start_paused = true)]
    async fn test_find_times_out_within_margin() {
        let manager: CorrelationManager<String> = CorrelationManager::new();

        let started = Instant::now();
        let err = manager.find("missing", Duration::from_millis(50)).await.unwrap_err();
        let waited = started.elapsed();

        assert_eq!(
            err,
            CorrelationError::Timeout {
                key: "missing".to_string(),
                timeout: Duration::from_millis(50),
            }
        );
        assert!(waited >= Duration::from_millis(50));
        assert!(waited < Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_timeout_error_names_key_and_timeout() {
        let manager: CorrelationManager<String> = CorrelationManager::new();
        let err = manager.find("order-7", Duration::ZERO).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "No value for correlation key 'order-7' within 0ms"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_consumed_at_most_once() {
        let manager = CorrelationManager::new();
        manager.store("k", "v".to_string()).await;

        let (first, second) = tokio::join!(
            manager.find("k", Duration::from_millis(100)),
            manager.find("k", Duration::from_millis(100)),
        );

        let successes: Vec<String> = [first, second].into_iter().filter_map(Result::ok).collect();
        assert_eq!(successes, vec!["v".to_string()]);
        assert!(!manager.object_store().contains("k").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_finders_across_tasks() {
        let manager = CorrelationManager::new();
        manager.store("shared", 7u8).await;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let finder = manager.clone();
                tokio::spawn(async move { finder.find("shared", Duration::from_millis(200)).await })
            })
            .collect();

        let mut found = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                found += 1;
            }
        }
        assert_eq!(found, 1);
    }

    #[tokio::test]
    async fn test_find_with_unbounded_timeout() {
        let manager: CorrelationManager<i32> = CorrelationManager::new();
        manager.store("k", 1).await;
        assert_eq!(manager.find("k", Duration::MAX).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_timeout_waits_for_later_store() {
        let manager: CorrelationManager<i32> = CorrelationManager::new();
        let sender = manager.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            sender.store("slow", 9).await;
        });

        assert_eq!(manager.find("slow", Duration::MAX).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_timed_out_key_can_still_be_stored_later() {
        let manager: CorrelationManager<i32> = CorrelationManager::new();
        assert!(manager.find("late", Duration::ZERO).await.is_err());

        manager.store("late", 1).await;
        assert_eq!(manager.find("late", Duration::ZERO).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_try_find() {
        let manager: CorrelationManager<i32> = CorrelationManager::new();
        assert_eq!(manager.try_find("k").await, None);

        manager.store("k", 5).await;
        assert_eq!(manager.try_find("k").await, Some(5));
        assert_eq!(manager.try_find("k").await, None);
    }

    #[tokio::test]
    async fn test_swap_object_store() {
        let mut manager: CorrelationManager<i32> = CorrelationManager::new();
        manager.store("old", 1).await;

        let replacement: Arc<dyn ObjectStore<i32>> = Arc::new(InMemoryObjectStore::with_capacity_limit(1));
        manager.set_object_store(Arc::clone(&replacement));

        assert_eq!(manager.try_find("old").await, None);
        manager.store("a", 1).await;
        manager.store("b", 2).await;
        assert_eq!(replacement.len().await, 1);
        assert_eq!(manager.object_store().remove("b").await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_find_default_uses_config() {
        let config = CorrelationConfig {
            poll_interval_ms: 10,
            default_timeout_ms: 30,
            capacity: None,
        };
        let manager: CorrelationManager<String> = CorrelationManager::from_config(&config);
        assert_eq!(manager.poll_interval(), Duration::from_millis(10));

        let started = Instant::now();
        assert!(manager.find_default("nothing").await.is_err());
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert!(started.elapsed() < Duration::from_millis(40));
    }
}
