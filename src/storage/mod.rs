//! # Object storage
//!
//! Rendered thumbnails live in an object store addressed by [`CacheKey`]. The store is the only
//! state shared between pipeline runs and is the source of truth for memoization.
//!
//! Two runs for the same key may both miss the cache and both upload; uploads are idempotent
//! under a key and the content is deterministic, so the last write simply wins.

use std::time::Duration;

use crate::{cache_key::CacheKey, thumbnail_errors::ThumbnailError};

pub mod memory;
pub mod s3;

pub use memory::InMemoryStore;
pub use s3::S3Store;

pub trait ObjectStore {
    /// Whether an object is stored under `key`.
    ///
    /// Best effort: any failure, not found included, reads as `false`.
    fn exists(&self, key: &CacheKey) -> bool;

    /// Store `body` under `key`, replacing any previous object.
    fn upload(&self, key: &CacheKey, body: Vec<u8>, content_type: &str)
        -> Result<(), ThumbnailError>;

    /// Time limited retrieval URL of `key`.
    ///
    /// Pure signing operation: the object is not required to exist.
    fn presigned_url(&self, key: &CacheKey, ttl: Duration) -> Result<String, ThumbnailError>;
}
