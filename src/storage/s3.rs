use std::time::Duration;

use aws_sdk_s3::{
    config::{BehaviorVersion, Builder, Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};
use tokio::runtime::Runtime;
use tracing::debug;

use super::ObjectStore;
use crate::{cache_key::CacheKey, settings::StorageSettings, thumbnail_errors::ThumbnailError};

/// [`ObjectStore`] backed by an S3 compatible service.
///
/// The SDK client is built once from explicit [`StorageSettings`] and reused by every run. The
/// SDK is asynchronous; calls are driven to completion on a runtime owned by the store, so the
/// store must be used from worker threads, not from inside another async runtime.
#[derive(Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
    runtime: Runtime,
}

fn storage_error(err: impl std::fmt::Display) -> ThumbnailError {
    ThumbnailError::Storage(err.to_string())
}

impl S3Store {
    pub fn new(settings: &StorageSettings) -> Result<Self, ThumbnailError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let mut config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .force_path_style(false);
        if let Some(endpoint) = &settings.endpoint_url {
            config = config.endpoint_url(endpoint);
        }
        if let (Some(access_key), Some(secret_key)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            config = config.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "thumbservice-settings",
            ));
        }

        Ok(S3Store {
            client: Client::from_conf(config.build()),
            bucket: settings.bucket.clone(),
            runtime,
        })
    }
}

impl ObjectStore for S3Store {
    fn exists(&self, key: &CacheKey) -> bool {
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send();
        match self.runtime.block_on(head) {
            Ok(_) => true,
            Err(err) => {
                debug!("{key} not found in {}: {err}", self.bucket);
                false
            }
        }
    }

    fn upload(
        &self,
        key: &CacheKey,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ThumbnailError> {
        let put = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send();
        self.runtime.block_on(put).map_err(storage_error)?;
        Ok(())
    }

    fn presigned_url(&self, key: &CacheKey, ttl: Duration) -> Result<String, ThumbnailError> {
        let presigning = PresigningConfig::expires_in(ttl).map_err(storage_error)?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .presigned(presigning);
        let signed = self.runtime.block_on(request).map_err(storage_error)?;
        Ok(signed.uri().to_string())
    }
}
