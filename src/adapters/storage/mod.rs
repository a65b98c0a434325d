use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

pub mod s3;

pub use s3::S3Storage;

/// Write-only view of the website bucket.
#[async_trait]
pub trait ObjectStorage: Send + Sync + std::fmt::Debug + 'static {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()>;

    /// Confirms the bucket is reachable.
    async fn check(&self) -> Result<()>;
}
