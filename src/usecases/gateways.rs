use std::sync::Arc;

use async_trait::async_trait;

use crate::common::format::Format;
use crate::common::variant::VariantKind;
use crate::entities::media::{OriginalImage, VariantResult};
use crate::errors::{BucketError, TranscodeError, UploadError};

pub const DEFAULT_SIGNED_URL_TTL_SECONDS: u64 = 3600;

/// Object-storage port, scoped to the bucket the gateway was built with.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Verifies the bucket is reachable. Never creates it; absence is
    /// terminal for any ingest.
    async fn ensure_bucket(&self) -> Result<(), BucketError>;

    /// Uploads a blob and returns its public URL. Without `overwrite` an
    /// existing object at `path` is a conflict, never silently replaced.
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
        overwrite: bool,
    ) -> Result<String, UploadError>;

    /// Idempotent: deleting a missing path is not an error.
    async fn delete(&self, path: &str) -> Result<(), UploadError>;

    async fn delete_many(&self, paths: &[String]) -> Result<(), UploadError>;

    /// Time-boxed access URL for private paths.
    async fn signed_url(&self, path: &str, ttl_seconds: u64) -> Result<String, UploadError>;

    async fn signed_url_with_default_ttl(&self, path: &str) -> Result<String, UploadError> {
        self.signed_url(path, DEFAULT_SIGNED_URL_TTL_SECONDS).await
    }

    /// Enumeration for operational tooling; not on the hot upload path.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, UploadError>;

    fn public_url(&self, path: &str) -> String;
}

/// Pixel transcoding port.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Produces one variant from the shared original. The `original` kind
    /// is a byte-for-byte pass-through; everything else is decoded,
    /// resized, and re-encoded at the kind's fixed format and quality.
    async fn transcode(
        &self,
        original: Arc<OriginalImage>,
        kind: VariantKind,
    ) -> Result<VariantResult, TranscodeError>;

    /// Header probe: reads the pixel dimensions without a full decode.
    async fn dimensions(&self, data: Vec<u8>, format: Format)
        -> Result<(u32, u32), TranscodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::fakes::MemoryStorage;

    #[tokio::test]
    async fn signed_urls_default_to_an_hour() {
        let storage = MemoryStorage::new();

        let url = storage
            .signed_url_with_default_ttl("media/a.jpg")
            .await
            .unwrap();

        assert!(url.ends_with("expires=3600"));
    }
}
