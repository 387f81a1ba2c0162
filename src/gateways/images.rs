use std::io::Cursor;
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tokio::sync::Semaphore;
use tokio::task;

use crate::common::dimensions::dimensions_for;
use crate::common::format::Format;
use crate::common::variant::{config, VariantKind};
use crate::entities::media::{OriginalImage, VariantResult};
use crate::errors::TranscodeError;
use crate::usecases::gateways::Transcoder;

const MAX_TRANSCODE_WORKERS: usize = 8;

struct ImagesImpl {
    permits: Arc<Semaphore>,
}

/// Pixel work is CPU-bound; it runs on the blocking pool behind a
/// semaphore sized to the machine, capped at MAX_TRANSCODE_WORKERS.
pub fn new() -> impl Transcoder {
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(MAX_TRANSCODE_WORKERS);

    ImagesImpl {
        permits: Arc::new(Semaphore::new(workers)),
    }
}

fn transcode_blocking(
    original: &OriginalImage,
    kind: VariantKind,
) -> Result<VariantResult, TranscodeError> {
    let variant_config = config(kind);

    let (target_width, target_height) = dimensions_for(original.width, original.height, kind)
        .map_err(|e| TranscodeError::Dimensions {
            kind,
            cause: e.to_string(),
        })?;

    let decoded =
        image::load_from_memory_with_format(&original.bytes, original.format.image_format())
            .map_err(|e| TranscodeError::Decode {
                kind,
                cause: e.to_string(),
            })?;

    let resized = if variant_config.height == Some(variant_config.width) {
        // Square crop: cover the target box, then center-crop the overflow.
        decoded.resize_to_fill(target_width, target_height, FilterType::Lanczos3)
    } else {
        decoded.resize_exact(target_width, target_height, FilterType::Lanczos3)
    };

    let mut buffer = Cursor::new(Vec::new());
    match variant_config.format {
        Format::Jpg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, variant_config.quality);
            encoder
                .encode_image(&resized.to_rgb8())
                .map_err(|e| TranscodeError::Encode {
                    kind,
                    cause: e.to_string(),
                })?;
        }
        other => {
            resized
                .write_to(&mut buffer, other.image_format())
                .map_err(|e| TranscodeError::Encode {
                    kind,
                    cause: e.to_string(),
                })?;
        }
    }

    Ok(VariantResult {
        kind,
        width: resized.width(),
        height: resized.height(),
        format: variant_config.format,
        bytes: buffer.into_inner(),
    })
}

#[async_trait]
impl Transcoder for ImagesImpl {
    async fn transcode(
        &self,
        original: Arc<OriginalImage>,
        kind: VariantKind,
    ) -> Result<VariantResult, TranscodeError> {
        // The original is never re-encoded; its bytes go to storage verbatim.
        if kind == VariantKind::Original {
            return Ok(VariantResult {
                kind,
                bytes: original.bytes.clone(),
                width: original.width,
                height: original.height,
                format: original.format,
            });
        }

        let _permit =
            self.permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| TranscodeError::Decode {
                    kind,
                    cause: format!("transcode pool closed: {}", e),
                })?;

        match task::spawn_blocking(move || transcode_blocking(&original, kind)).await {
            Ok(result) => result,
            Err(e) => Err(TranscodeError::Encode {
                kind,
                cause: format!("transcode task failed: {}", e),
            }),
        }
    }

    async fn dimensions(
        &self,
        data: Vec<u8>,
        format: Format,
    ) -> Result<(u32, u32), TranscodeError> {
        match task::spawn_blocking(move || {
            image::io::Reader::with_format(Cursor::new(data), format.image_format())
                .into_dimensions()
                .map_err(|e| TranscodeError::Decode {
                    kind: VariantKind::Original,
                    cause: e.to_string(),
                })
        })
        .await
        {
            Ok(result) => result,
            Err(e) => Err(TranscodeError::Decode {
                kind: VariantKind::Original,
                cause: format!("probe task failed: {}", e),
            }),
        }
    }
}
