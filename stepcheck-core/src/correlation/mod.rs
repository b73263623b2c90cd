// Correlation Module
// Time-bounded handoff of produced values (e.g. received exchanges) between DSL steps

pub mod manager;
pub mod store;

pub use manager::{correlation_key_name, CorrelationError, CorrelationManager, CORRELATION_KEY_PREFIX};
pub use store::{CorrelationEntry, InMemoryObjectStore, ObjectStore};
