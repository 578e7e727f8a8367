//! Per-school cache of the class and arm lists.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use school_assist_core::ClassCatalog;
use school_assist_storage::StorageBackend;
use school_assist_storage::StorageError;
use school_assist_storage::traits::SchoolStore;
use tokio::sync::RwLock;

struct CachedCatalog {
    loaded_at: Instant,
    catalog: Arc<ClassCatalog>,
}

/// Read-through cache; entries older than the TTL are reloaded from storage.
pub struct ClassCatalogCache {
    storage: Arc<StorageBackend>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedCatalog>>,
}

impl ClassCatalogCache {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, ttl: Duration) -> Self {
        Self { storage, ttl, entries: RwLock::new(HashMap::new()) }
    }

    /// Cached catalog of a school, loading it when absent or stale.
    pub async fn get(&self, school_id: &str) -> Result<Arc<ClassCatalog>, StorageError> {
        if let Some(entry) = self.entries.read().await.get(school_id)
            && entry.loaded_at.elapsed() < self.ttl
        {
            return Ok(Arc::clone(&entry.catalog));
        }

        let catalog = Arc::new(self.load_fresh(school_id).await?);
        self.entries.write().await.insert(
            school_id.to_owned(),
            CachedCatalog { loaded_at: Instant::now(), catalog: Arc::clone(&catalog) },
        );
        tracing::debug!(
            school_id,
            classes = catalog.classes.len(),
            arms = catalog.arms.len(),
            "class catalog loaded"
        );
        Ok(catalog)
    }

    /// Read the catalog straight from storage, skipping the cache.
    pub async fn load_fresh(&self, school_id: &str) -> Result<ClassCatalog, StorageError> {
        let classes = self.storage.list_classes(school_id).await?;
        let arms = self.storage.list_arms(school_id).await?;
        Ok(ClassCatalog::new(classes, arms))
    }

    /// Drop a school's cached entry so the next read reloads it.
    pub async fn invalidate(&self, school_id: &str) {
        self.entries.write().await.remove(school_id);
    }
}
