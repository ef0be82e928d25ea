use async_trait::async_trait;
use aws_sdk_s3 as s3;
use axum::body::Bytes;
use s3::primitives::ByteStream;
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

/// Why a stored object could not be written.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid object key: {0:?}")]
    InvalidKey(String),

    #[error("local storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("object storage request failed: {0}")]
    Remote(String),
}

/// StorageService
///
/// Contract for persisting uploaded media. Handlers only see this trait, so the
/// backend (local disk, S3/MinIO, or the test mock) is chosen at startup.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Prepares the backend (creates the upload directory or bucket). Idempotent,
    /// safe to call at every startup.
    async fn ensure_bucket_exists(&self);

    /// Stores `bytes` under `key` and returns the public URL of the object.
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError>;
}

/// LocalDiskStorage
///
/// Writes objects into a directory that the router serves under `/uploads`.
#[derive(Clone, Debug)]
pub struct LocalDiskStorage {
    upload_dir: PathBuf,
    public_url: String,
}

impl LocalDiskStorage {
    pub fn new(upload_dir: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.upload_dir
    }
}

#[async_trait]
impl StorageService for LocalDiskStorage {
    async fn ensure_bucket_exists(&self) {
        if let Err(e) = tokio::fs::create_dir_all(&self.upload_dir).await {
            tracing::error!(dir = %self.upload_dir.display(), "Failed to create upload directory: {}", e);
        }
    }

    async fn put_object(
        &self,
        key: &str,
        _content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let key = sanitize_key(key)?;
        let path = self.upload_dir.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        Ok(format!("{}/uploads/{}", self.public_url, key))
    }
}

/// S3StorageClient
///
/// S3-compatible backend (MinIO locally, any S3 provider in production).
/// `force_path_style(true)` is required for MinIO.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    endpoint: String,
    bucket_name: String,
}

impl S3StorageClient {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket_name: bucket.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// CreateBucket fails harmlessly when the bucket already exists.
    async fn ensure_bucket_exists(&self) {
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, "CreateBucket skipped: {}", e);
        }
    }

    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let key = sanitize_key(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;

        Ok(format!("{}/{}/{}", self.endpoint, self.bucket_name, key))
    }
}

/// sanitize_key
///
/// Strips directory navigation (`..`, `.`) and empty segments from an object key.
/// A key with nothing left is rejected.
pub fn sanitize_key(key: &str) -> Result<String, StorageError> {
    let cleaned = key
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    if cleaned.is_empty() {
        Err(StorageError::InvalidKey(key.to_string()))
    } else {
        Ok(cleaned)
    }
}

/// A write recorded by [`MockStorageService`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

/// MockStorageService
///
/// In-memory backend for tests: records every write and returns a deterministic URL.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, every write fails.
    pub should_fail: bool,
    stored: Arc<Mutex<Vec<StoredObject>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Vec<StoredObject> {
        self.stored
            .lock()
            .map(|objects| objects.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError::Remote(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }

        let key = sanitize_key(key)?;
        if let Ok(mut stored) = self.stored.lock() {
            stored.push(StoredObject {
                key: key.clone(),
                content_type: content_type.to_string(),
                size: bytes.len(),
            });
        }
        Ok(format!("http://localhost:9000/mock-bucket/{key}"))
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
