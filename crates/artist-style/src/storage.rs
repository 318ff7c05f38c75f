pub mod file;
pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::StyleResult;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;

/// Host-owned persistent key-value store.
///
/// `get` returns only the keys that are present.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, keys: &[&str]) -> StyleResult<Map<String, Value>>;
    async fn set(&self, entries: Map<String, Value>) -> StyleResult<()>;
    async fn remove(&self, keys: &[&str]) -> StyleResult<()>;
}

pub type SharedKvStore = Arc<dyn KvStore>;
