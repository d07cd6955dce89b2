use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::ObjectStore;
use crate::{cache_key::CacheKey, thumbnail_errors::ThumbnailError};

/// Object stored by [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Process local [`ObjectStore`], for development runs and tests.
///
/// URLs are built from `base_url` and carry the requested lifetime as an `expires` query
/// parameter; nothing serves them.
#[derive(Debug)]
pub struct InMemoryStore {
    base_url: String,
    objects: Mutex<HashMap<CacheKey, StoredObject>>,
}

impl InMemoryStore {
    pub fn new(base_url: &str) -> Self {
        InMemoryStore {
            base_url: base_url.trim_end_matches('/').to_owned(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<CacheKey, StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<StoredObject> {
        self.objects().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        InMemoryStore::new("memory://thumbnails")
    }
}

impl ObjectStore for InMemoryStore {
    fn exists(&self, key: &CacheKey) -> bool {
        self.objects().contains_key(key)
    }

    fn upload(
        &self,
        key: &CacheKey,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ThumbnailError> {
        self.objects().insert(
            key.clone(),
            StoredObject {
                body,
                content_type: content_type.to_owned(),
            },
        );
        Ok(())
    }

    fn presigned_url(&self, key: &CacheKey, ttl: Duration) -> Result<String, ThumbnailError> {
        Ok(format!(
            "{}/{}?expires={}",
            self.base_url,
            key,
            ttl.as_secs()
        ))
    }
}
