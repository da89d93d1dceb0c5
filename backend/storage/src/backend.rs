//! `ObjectStorage` backends built on the `object_store` crate.
//!
//! `S3Storage` talks to a real bucket; `MemoryStorage` keeps everything in
//! process and fakes signed URLs.

use std::time::Duration;

use accessplus_core::ObjectStorage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{
    aws::{AmazonS3, AmazonS3Builder, AwsCredentialProvider},
    memory::InMemory,
    path::Path,
    signer::Signer,
    Attribute, Attributes, ObjectStore, PutOptions, PutPayload,
};
use tracing::debug;

async fn list_keys(store: &dyn ObjectStore, prefix: Option<&str>) -> Result<Vec<String>> {
    let prefix = prefix.map(Path::from);
    let metas: Vec<_> = store
        .list(prefix.as_ref())
        .try_collect()
        .await
        .context("Failed to list objects")?;
    Ok(metas.into_iter().map(|m| m.location.to_string()).collect())
}

async fn get_object(store: &dyn ObjectStore, key: &str) -> Result<Option<Bytes>> {
    match store.get(&Path::from(key)).await {
        Ok(result) => {
            let body = result
                .bytes()
                .await
                .with_context(|| format!("Failed to read object {key}"))?;
            Ok(Some(body))
        }
        Err(object_store::Error::NotFound { .. }) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to get object {key}")),
    }
}

async fn put_object(store: &dyn ObjectStore, key: &str, body: Bytes, content_type: &str) -> Result<()> {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, content_type.to_string().into());
    let opts = PutOptions {
        attributes,
        ..Default::default()
    };
    debug!(key, bytes = body.len(), content_type, "Putting object");
    store
        .put_opts(&Path::from(key), PutPayload::from(body), opts)
        .await
        .with_context(|| format!("Failed to put object {key}"))?;
    Ok(())
}

/// Amazon S3 bucket.
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
}

impl S3Storage {
    /// Connect to `bucket`. Without an explicit credential provider the
    /// builder falls back to `AWS_*` variables and instance metadata.
    pub fn connect(
        bucket: &str,
        region: &str,
        credentials: Option<AwsCredentialProvider>,
    ) -> Result<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(region);
        if let Some(credentials) = credentials {
            builder = builder.with_credentials(credentials);
        }
        let store = builder
            .build()
            .with_context(|| format!("Failed to configure S3 client for bucket {bucket}"))?;
        Ok(Self {
            store,
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    fn name(&self) -> &str {
        "s3"
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        list_keys(&self.store, prefix).await
    }

    async fn get_object(&self, key: &str) -> Result<Option<Bytes>> {
        get_object(&self.store, key).await
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        put_object(&self.store, key, body, content_type).await
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        let url = self
            .store
            .signed_url(reqwest::Method::GET, &Path::from(key), expires_in)
            .await
            .with_context(|| format!("Failed to presign {key}"))?;
        Ok(url.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, key)
    }
}

/// In-process storage for tests and offline runs.
pub struct MemoryStorage {
    store: InMemory,
    base_url: String,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_base_url("memory://bucket")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            store: InMemory::new(),
            base_url: base_url.into(),
        }
    }

    /// Content type recorded for `key`, if the object exists.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        let result = self.store.get(&Path::from(key)).await.ok()?;
        result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.to_string())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        list_keys(&self.store, prefix).await
    }

    async fn get_object(&self, key: &str) -> Result<Option<Bytes>> {
        get_object(&self.store, key).await
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        put_object(&self.store, key, body, content_type).await
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        Ok(format!(
            "{}/{}?expires_in={}",
            self.base_url,
            key,
            expires_in.as_secs()
        ))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
