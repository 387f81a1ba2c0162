use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;

use crate::errors::{BucketError, UploadError};
use crate::settings::Settings;
use crate::usecases::gateways::Storage;

struct S3Impl {
    settings: Arc<Settings>,
    client: Client,
}

pub async fn new(settings: Arc<Settings>) -> impl Storage {
    let config = aws_config::from_env()
        .region(Region::new(settings.region()))
        .endpoint_url(settings.endpoint())
        .load()
        .await;
    let client = Client::new(&config);

    S3Impl { settings, client }
}

impl S3Impl {
    fn translate<E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static>(
        &self,
        path: &str,
        error: E,
    ) -> UploadError {
        match error.code() {
            Some("NoSuchBucket") => UploadError::BucketMissing {
                bucket: self.settings.bucket(),
            },
            Some("AccessDenied") => UploadError::AccessDenied {
                path: path.to_string(),
            },
            _ => UploadError::Backend {
                cause: format!("{}", DisplayErrorContext(&error)),
            },
        }
    }
}

#[async_trait]
impl Storage for S3Impl {
    async fn ensure_bucket(&self) -> Result<(), BucketError> {
        match self
            .client
            .head_bucket()
            .bucket(self.settings.bucket())
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Err(BucketError::NotFound {
                        bucket: self.settings.bucket(),
                    })
                } else {
                    Err(BucketError::Unreachable {
                        bucket: self.settings.bucket(),
                        cause: format!("{}", DisplayErrorContext(&service_error)),
                    })
                }
            }
        }
    }

    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
        overwrite: bool,
    ) -> Result<String, UploadError> {
        if !overwrite {
            match self
                .client
                .head_object()
                .bucket(self.settings.bucket())
                .key(path)
                .send()
                .await
            {
                Ok(_) => {
                    return Err(UploadError::AlreadyExists {
                        path: path.to_string(),
                    })
                }
                Err(e) => {
                    let service_error = e.into_service_error();
                    if !service_error.is_not_found() {
                        return Err(self.translate(path, service_error));
                    }
                }
            }
        }

        match self
            .client
            .put_object()
            .bucket(self.settings.bucket())
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
        {
            Ok(_) => Ok(self.public_url(path)),
            Err(e) => Err(self.translate(path, e.into_service_error())),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), UploadError> {
        // S3 deletes are idempotent; a missing key still returns 204.
        match self
            .client
            .delete_object()
            .bucket(self.settings.bucket())
            .key(path)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => Err(self.translate(path, e.into_service_error())),
        }
    }

    async fn delete_many(&self, paths: &[String]) -> Result<(), UploadError> {
        if paths.is_empty() {
            return Ok(());
        }

        let objects = paths
            .iter()
            .map(|path| ObjectIdentifier::builder().key(path).build())
            .collect::<Vec<_>>();

        match self
            .client
            .delete_objects()
            .bucket(self.settings.bucket())
            .delete(Delete::builder().set_objects(Some(objects)).build())
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => Err(self.translate("", e.into_service_error())),
        }
    }

    async fn signed_url(&self, path: &str, ttl_seconds: u64) -> Result<String, UploadError> {
        let presigning_config = PresigningConfig::expires_in(Duration::from_secs(ttl_seconds))
            .map_err(|e| UploadError::Backend {
                cause: format!("invalid presigning ttl: {}", e),
            })?;

        match self
            .client
            .get_object()
            .bucket(self.settings.bucket())
            .key(path)
            .presigned(presigning_config)
            .await
        {
            Ok(request) => Ok(request.uri().to_string()),
            Err(e) => Err(self.translate(path, e.into_service_error())),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, UploadError> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(self.settings.bucket())
                .prefix(prefix);
            if let Some(token) = &continuation {
                request = request.continuation_token(token);
            }

            let page = request
                .send()
                .await
                .map_err(|e| self.translate(prefix, e.into_service_error()))?;

            for object in page.contents().unwrap_or_default() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }

            match page.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(keys)
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.settings.storage_external_url(),
            self.settings.bucket(),
            path
        )
    }
}
