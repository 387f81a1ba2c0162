use thiserror::Error;

use crate::common::variant::VariantKind;

/// Terminal precondition failures, reported before any transcoding starts.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("unsupported media type: {mime}")]
    UnsupportedMediaType { mime: String },

    #[error("file is empty")]
    EmptyFile,

    #[error("file is {size} bytes, limit is {max}")]
    FileTooLarge { size: usize, max: usize },

    #[error("image is {width}x{height}, minimum is {min}x{min}")]
    ImageTooSmall { width: u32, height: u32, min: u32 },

    #[error("image is {width}x{height}, maximum is {max}x{max}")]
    ImageTooLarge { width: u32, height: u32, max: u32 },

    #[error("could not read image: {cause}")]
    UnreadableImage { cause: String },
}

/// Failure producing one variant; isolated per kind, never aborts siblings.
#[derive(Debug, Clone, Error)]
pub enum TranscodeError {
    #[error("could not decode source for {kind} variant: {cause}")]
    Decode { kind: VariantKind, cause: String },

    #[error("could not size {kind} variant: {cause}")]
    Dimensions { kind: VariantKind, cause: String },

    #[error("could not encode {kind} variant: {cause}")]
    Encode { kind: VariantKind, cause: String },
}

/// The aspect-preserving branch fails closed instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    #[error("original width is zero")]
    ZeroWidth,
}

/// Bucket-level failures are terminal for the whole ingest; the bucket is
/// provisioned out of band, never created here.
#[derive(Debug, Clone, Error)]
pub enum BucketError {
    #[error("bucket {bucket} does not exist; provision it before ingesting")]
    NotFound { bucket: String },

    #[error("bucket {bucket} is unreachable: {cause}")]
    Unreachable { bucket: String, cause: String },
}

#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("bucket {bucket} is missing")]
    BucketMissing { bucket: String },

    #[error("access denied writing {path}")]
    AccessDenied { path: String },

    #[error("{path} already exists and overwrite was not requested")]
    AlreadyExists { path: String },

    #[error("storage backend failure: {cause}")]
    Backend { cause: String },
}

/// Everything that can terminate an ingest. Derived-variant failures are
/// not represented here: they degrade the result mapping instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Bucket(#[from] BucketError),

    #[error("could not transcode original: {0}")]
    OriginalTranscode(TranscodeError),

    #[error("could not upload original: {0}")]
    OriginalUpload(UploadError),
}
