use std::time::Duration;

use anyhow::{Context, Result};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::constants::intervals::{BUCKET_RETRY_ATTEMPTS, BUCKET_RETRY_DELAY};

/// Object storage used for profile photos.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<()>;

    /// Signed GET URL valid for `ttl`.
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String>;

    /// Creates the bucket when it does not exist yet.
    async fn ensure_bucket(&self) -> Result<()>;
}

/// S3-compatible store (MinIO in development). Uploads go through the internal
/// endpoint; presigned URLs are minted against the external one so clients
/// outside the mesh can resolve them.
pub struct S3ObjectStore {
    internal: Client,
    external: Client,
    bucket: String,
}

impl S3ObjectStore {
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        let external_endpoint = if config.external_endpoint.is_empty() {
            &config.endpoint
        } else {
            &config.external_endpoint
        };

        Self {
            internal: build_client(config, &config.endpoint),
            external: build_client(config, external_endpoint),
            bucket: config.bucket.clone(),
        }
    }
}

fn build_client(config: &StorageConfig, endpoint: &str) -> Client {
    let credentials = Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "userservice-static",
    );

    let mut builder = Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .credentials_provider(credentials)
        .force_path_style(true);

    if !endpoint.is_empty() {
        builder = builder.endpoint_url(endpoint);
    }

    Client::from_conf(builder.build())
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<()> {
        self.internal
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .with_context(|| format!("Failed to upload object {key}"))?;

        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(ttl).context("Invalid presign TTL")?;

        let request = self
            .external
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .with_context(|| format!("Failed to presign object {key}"))?;

        Ok(request.uri().to_string())
    }

    async fn ensure_bucket(&self) -> Result<()> {
        if self
            .internal
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            return Ok(());
        }

        self.internal
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .with_context(|| format!("Failed to create bucket {}", self.bucket))?;

        info!(bucket = %self.bucket, "Created object storage bucket");
        Ok(())
    }
}

/// Startup helper: the object store often comes up after this service.
pub async fn ensure_bucket_with_retry(store: &dyn ObjectStore) -> bool {
    for attempt in 1..=BUCKET_RETRY_ATTEMPTS {
        match store.ensure_bucket().await {
            Ok(()) => return true,
            Err(e) => {
                warn!(attempt, error = %e, "Object storage not ready");
                tokio::time::sleep(BUCKET_RETRY_DELAY).await;
            }
        }
    }

    false
}
