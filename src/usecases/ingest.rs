use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::common::format::Format;
use crate::common::variant::{storage_path_for, variants_to_generate, VariantKind};
use crate::entities::media::{MediaRecord, OriginalImage, StorageRecord};
use crate::errors::{IngestError, TranscodeError, UploadError, ValidationError};
use crate::usecases::gateways::{Storage, Transcoder};

const MAX_IMAGE_SIZE_BYTES: usize = 10 * 1024 * 1024;
const MIN_DIMENSION: u32 = 50;
const MAX_DIMENSION: u32 = 8000;
const MAX_CONCURRENT_UPLOADS: usize = 6;

/// Pipeline entry point: validate the source, decide which variants are
/// worth producing, transcode and upload them, and aggregate whatever
/// succeeded. A failed derived variant degrades the result; a failed
/// original fails the ingest.
pub struct IngestMedia {
    storage: Arc<dyn Storage>,
    transcoder: Arc<dyn Transcoder>,
    upload_permits: Arc<Semaphore>,
}

pub fn new(storage: Arc<dyn Storage>, transcoder: Arc<dyn Transcoder>) -> IngestMedia {
    IngestMedia {
        storage,
        transcoder,
        upload_permits: Arc::new(Semaphore::new(MAX_CONCURRENT_UPLOADS)),
    }
}

#[derive(Debug, Error)]
enum VariantFailure {
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl IngestMedia {
    pub async fn execute(
        &self,
        slug: &str,
        declared_mime: &str,
        data: Vec<u8>,
    ) -> Result<MediaRecord, IngestError> {
        let original = Arc::new(self.validate(slug, declared_mime, data).await?);

        self.storage.ensure_bucket().await?;

        let kinds = variants_to_generate(original.width, original.height);

        let mut tasks: JoinSet<(VariantKind, Result<StorageRecord, VariantFailure>)> =
            JoinSet::new();
        for kind in kinds {
            let original = original.clone();
            let storage = self.storage.clone();
            let transcoder = self.transcoder.clone();
            let upload_permits = self.upload_permits.clone();

            tasks.spawn(async move {
                let result =
                    produce_variant(original, kind, storage, transcoder, upload_permits).await;
                (kind, result)
            });
        }

        let mut variants = BTreeMap::new();
        let mut original_failure: Option<VariantFailure> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((kind, Ok(record))) => {
                    variants.insert(kind, record);
                }
                Ok((kind, Err(failure))) if kind == VariantKind::Original => {
                    original_failure = Some(failure);
                }
                Ok((kind, Err(failure))) => {
                    tracing::warn!("skipping {} variant of {}: {}", kind, original.slug, failure);
                }
                Err(e) => {
                    tracing::warn!("variant task for {} failed: {}", original.slug, e);
                }
            }
        }

        if let Some(failure) = original_failure {
            return Err(match failure {
                VariantFailure::Transcode(e) => IngestError::OriginalTranscode(e),
                VariantFailure::Upload(e) => IngestError::OriginalUpload(e),
            });
        }

        // Covers the task itself going down: without the original there is
        // no canonical source, so the asset is unusable.
        if !variants.contains_key(&VariantKind::Original) {
            return Err(IngestError::OriginalUpload(UploadError::Backend {
                cause: String::from("original variant task did not complete"),
            }));
        }

        tracing::info!(
            "ingested {} with {} of {} planned variants",
            original.slug,
            variants.len(),
            variants_to_generate(original.width, original.height).len(),
        );

        Ok(MediaRecord {
            slug: original.slug.clone(),
            variants,
        })
    }

    /// Hard preconditions, checked before any transcoding. Violations are
    /// terminal and never retried.
    async fn validate(
        &self,
        slug: &str,
        declared_mime: &str,
        data: Vec<u8>,
    ) -> Result<OriginalImage, IngestError> {
        if data.is_empty() {
            return Err(ValidationError::EmptyFile.into());
        }
        if data.len() > MAX_IMAGE_SIZE_BYTES {
            return Err(ValidationError::FileTooLarge {
                size: data.len(),
                max: MAX_IMAGE_SIZE_BYTES,
            }
            .into());
        }

        let declared =
            Format::from_mime(declared_mime).ok_or_else(|| ValidationError::UnsupportedMediaType {
                mime: declared_mime.to_string(),
            })?;
        // Magic bytes win over the declared mime when they are conclusive;
        // TGA has no magic bytes and rides on the declaration.
        let format = Format::detect(&data).unwrap_or(declared);

        let (width, height) = self
            .transcoder
            .dimensions(data.clone(), format)
            .await
            .map_err(|e| ValidationError::UnreadableImage {
                cause: e.to_string(),
            })?;

        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            return Err(ValidationError::ImageTooSmall {
                width,
                height,
                min: MIN_DIMENSION,
            }
            .into());
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ValidationError::ImageTooLarge {
                width,
                height,
                max: MAX_DIMENSION,
            }
            .into());
        }

        Ok(OriginalImage {
            slug: slug.to_string(),
            byte_size: data.len(),
            bytes: data,
            width,
            height,
            format,
        })
    }
}

/// One variant end to end. The upload waits only on this variant's own
/// transcode, never on siblings.
async fn produce_variant(
    original: Arc<OriginalImage>,
    kind: VariantKind,
    storage: Arc<dyn Storage>,
    transcoder: Arc<dyn Transcoder>,
    upload_permits: Arc<Semaphore>,
) -> Result<StorageRecord, VariantFailure> {
    let result = transcoder.transcode(original.clone(), kind).await?;

    let _permit = upload_permits
        .acquire_owned()
        .await
        .map_err(|e| UploadError::Backend {
            cause: format!("upload pool closed: {}", e),
        })
        .map_err(VariantFailure::Upload)?;

    let path = storage_path_for(&original.slug, kind, original.format);
    let content_type = result.format.content_type();
    let size_bytes = result.byte_size();
    let (width, height, format) = (result.width, result.height, result.format);

    // Same slug, same path: re-running an ingest overwrites in place.
    let url = storage
        .upload(&path, &content_type, result.bytes, true)
        .await
        .map_err(VariantFailure::Upload)?;

    Ok(StorageRecord {
        kind,
        url,
        storage_path: path,
        size_bytes,
        width,
        height,
        format,
    })
}
