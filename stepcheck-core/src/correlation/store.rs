// Correlation Object Store
// Keyed handoff storage between a send step and a later receive step

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::Mutex;

/// A stored value and when it arrived
#[derive(Debug, Clone)]
pub struct CorrelationEntry<T> {
    pub key: String,
    pub value: T,
    pub created_at: Instant,
    /// Insertion order within the owning store; orders entries with equal `created_at`
    pub sequence: u64,
}

impl<T> CorrelationEntry<T> {
    pub fn new(key: impl Into<String>, value: T, sequence: u64) -> Self {
        Self {
            key: key.into(),
            value,
            created_at: Instant::now(),
            sequence,
        }
    }
}

/// Backing store for the correlation manager.
///
/// `remove` must be atomic: of several concurrent removals of the same key,
/// at most one gets the value.
#[async_trait::async_trait]
pub trait ObjectStore<T: Send + 'static>: Send + Sync {
    /// Insert or overwrite the entry for `key`
    async fn add(&self, key: &str, value: T);

    /// Remove and return the entry for `key`
    async fn remove(&self, key: &str) -> Option<T>;

    async fn contains(&self, key: &str) -> bool;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn clear(&self);
}

/// In-memory store guarded by a single mutex, with optional capacity.
///
/// When full, adding a new key evicts the oldest entry.
#[derive(Debug)]
pub struct InMemoryObjectStore<T> {
    entries: Mutex<Entries<T>>,
    capacity: Option<usize>,
}

#[derive(Debug)]
struct Entries<T> {
    by_key: HashMap<String, CorrelationEntry<T>>,
    next_sequence: u64,
}

impl<T> Entries<T> {
    fn new() -> Self {
        Self {
            by_key: HashMap::new(),
            next_sequence: 0,
        }
    }

    /// Key of the earliest inserted entry
    fn oldest_key(&self) -> Option<String> {
        self.by_key
            .values()
            .min_by_key(|entry| (entry.created_at, entry.sequence))
            .map(|entry| entry.key.clone())
    }
}

impl<T> InMemoryObjectStore<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries::new()),
            capacity: None,
        }
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::new()),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl<T> Default for InMemoryObjectStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<T: Send + 'static> ObjectStore<T> for InMemoryObjectStore<T> {
    async fn add(&self, key: &str, value: T) {
        let mut entries = self.entries.lock().await;

        if let Some(capacity) = self.capacity {
            if !entries.by_key.contains_key(key) && entries.by_key.len() >= capacity {
                if let Some(oldest) = entries.oldest_key() {
                    tracing::warn!(evicted = %oldest, capacity, "correlation store full, evicting oldest entry");
                    entries.by_key.remove(&oldest);
                }
            }
        }

        let sequence = entries.next_sequence;
        entries.next_sequence += 1;
        entries
            .by_key
            .insert(key.to_string(), CorrelationEntry::new(key, value, sequence));
    }

    async fn remove(&self, key: &str) -> Option<T> {
        self.entries.lock().await.by_key.remove(key).map(|entry| entry.value)
    }

    async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.by_key.contains_key(key)
    }

    async fn len(&self) -> usize {
        self.entries.lock().await.by_key.len()
    }

    async fn clear(&self) {
        self.entries.lock().await.by_key.clear();
    }
}
