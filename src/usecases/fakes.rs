//! In-memory test doubles for the storage and transcoder ports.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::common::format::Format;
use crate::common::variant::VariantKind;
use crate::entities::media::{OriginalImage, VariantResult};
use crate::errors::{BucketError, TranscodeError, UploadError};
use crate::gateways;
use crate::usecases::gateways::{Storage, Transcoder};

pub struct MemoryStorage {
    bucket_exists: bool,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage {
            bucket_exists: true,
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn without_bucket() -> MemoryStorage {
        MemoryStorage {
            bucket_exists: false,
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn preloaded(paths: &[&str]) -> MemoryStorage {
        let storage = MemoryStorage::new();
        {
            let mut objects = storage.objects.lock().unwrap();
            for path in paths {
                objects.insert(path.to_string(), Vec::new());
            }
        }
        storage
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn list_sync(&self, prefix: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ensure_bucket(&self) -> Result<(), BucketError> {
        if self.bucket_exists {
            Ok(())
        } else {
            Err(BucketError::NotFound {
                bucket: String::from("memory"),
            })
        }
    }

    async fn upload(
        &self,
        path: &str,
        _content_type: &str,
        body: Vec<u8>,
        overwrite: bool,
    ) -> Result<String, UploadError> {
        let mut objects = self.objects.lock().unwrap();
        if !overwrite && objects.contains_key(path) {
            return Err(UploadError::AlreadyExists {
                path: path.to_string(),
            });
        }
        objects.insert(path.to_string(), body);
        Ok(self.public_url(path))
    }

    async fn delete(&self, path: &str) -> Result<(), UploadError> {
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }

    async fn delete_many(&self, paths: &[String]) -> Result<(), UploadError> {
        let mut objects = self.objects.lock().unwrap();
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }

    async fn signed_url(&self, path: &str, ttl_seconds: u64) -> Result<String, UploadError> {
        Ok(format!("memory://{}?expires={}", path, ttl_seconds))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, UploadError> {
        Ok(self.list_sync(prefix))
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{}", path)
    }
}

/// Uploads the derived variants but rejects the original (the only path
/// without the `__` separator).
pub struct RejectOriginalStorage {
    inner: MemoryStorage,
}

impl RejectOriginalStorage {
    pub fn new() -> RejectOriginalStorage {
        RejectOriginalStorage {
            inner: MemoryStorage::new(),
        }
    }
}

#[async_trait]
impl Storage for RejectOriginalStorage {
    async fn ensure_bucket(&self) -> Result<(), BucketError> {
        self.inner.ensure_bucket().await
    }

    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
        overwrite: bool,
    ) -> Result<String, UploadError> {
        if !path.contains("__") {
            return Err(UploadError::AccessDenied {
                path: path.to_string(),
            });
        }
        self.inner.upload(path, content_type, body, overwrite).await
    }

    async fn delete(&self, path: &str) -> Result<(), UploadError> {
        self.inner.delete(path).await
    }

    async fn delete_many(&self, paths: &[String]) -> Result<(), UploadError> {
        self.inner.delete_many(paths).await
    }

    async fn signed_url(&self, path: &str, ttl_seconds: u64) -> Result<String, UploadError> {
        self.inner.signed_url(path, ttl_seconds).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, UploadError> {
        self.inner.list(prefix).await
    }

    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }
}

/// Real transcoder with one kind forced to fail, for partial-failure tests.
pub struct FlakyTranscoder {
    inner: Arc<dyn Transcoder>,
    fail_kind: VariantKind,
}

impl FlakyTranscoder {
    pub fn failing(fail_kind: VariantKind) -> FlakyTranscoder {
        FlakyTranscoder {
            inner: Arc::new(gateways::images::new()),
            fail_kind,
        }
    }
}

#[async_trait]
impl Transcoder for FlakyTranscoder {
    async fn transcode(
        &self,
        original: Arc<OriginalImage>,
        kind: VariantKind,
    ) -> Result<VariantResult, TranscodeError> {
        if kind == self.fail_kind {
            return Err(TranscodeError::Encode {
                kind,
                cause: String::from("forced failure"),
            });
        }
        self.inner.transcode(original, kind).await
    }

    async fn dimensions(
        &self,
        data: Vec<u8>,
        format: Format,
    ) -> Result<(u32, u32), TranscodeError> {
        self.inner.dimensions(data, format).await
    }
}
