use std::collections::BTreeMap;

use serde::Serialize;

use crate::common::format::Format;
use crate::common::variant::VariantKind;

/// The validated source image. Built once at ingestion, read-only after;
/// variant tasks share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct OriginalImage {
    pub slug: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: Format,
    pub byte_size: usize,
}

/// One transcoded rendition, alive only between transcode and upload.
#[derive(Debug, Clone)]
pub struct VariantResult {
    pub kind: VariantKind,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: Format,
}

impl VariantResult {
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

/// Where one variant ended up. The mapping of these is the only durable
/// artifact of an ingest.
#[derive(Debug, Clone, Serialize)]
pub struct StorageRecord {
    pub kind: VariantKind,
    pub url: String,
    pub storage_path: String,
    pub size_bytes: usize,
    pub width: u32,
    pub height: u32,
    pub format: Format,
}

/// Successful ingest result. The variant set may be a strict subset of the
/// planned set; callers must treat missing derived kinds as degradation,
/// not as an error.
#[derive(Debug, Clone, Serialize)]
pub struct MediaRecord {
    pub slug: String,
    pub variants: BTreeMap<VariantKind, StorageRecord>,
}
