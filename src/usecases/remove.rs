use std::sync::Arc;

use crate::common::variant::STORAGE_PREFIX;
use crate::errors::UploadError;
use crate::usecases::gateways::Storage;

/// Operational cleanup: deletes every stored variant of a slug.
pub struct RemoveMedia {
    storage: Arc<dyn Storage>,
}

pub fn new(storage: Arc<dyn Storage>) -> RemoveMedia {
    RemoveMedia { storage }
}

impl RemoveMedia {
    /// Returns the paths that were removed. Deletion is idempotent, so an
    /// unknown slug simply removes nothing.
    pub async fn execute(&self, slug: &str) -> Result<Vec<String>, UploadError> {
        let prefix = format!("{}/{}", STORAGE_PREFIX, slug);
        let keys = self.storage.list(&prefix).await?;

        let paths: Vec<String> = keys
            .into_iter()
            .filter(|key| belongs_to(key, slug))
            .collect();

        self.storage.delete_many(&paths).await?;

        if !paths.is_empty() {
            tracing::info!("removed {} objects for {}", paths.len(), slug);
        }

        Ok(paths)
    }
}

/// A prefix listing also matches longer slugs (`media/a` matches
/// `media/ab.jpg`); keep only `{slug}.{ext}` and `{slug}__{kind}.{ext}`.
fn belongs_to(key: &str, slug: &str) -> bool {
    let name = match key.strip_prefix(STORAGE_PREFIX) {
        Some(rest) => match rest.strip_prefix('/') {
            Some(name) => name,
            None => return false,
        },
        None => return false,
    };

    match name.strip_prefix(slug) {
        Some(rest) => rest.starts_with('.') || rest.starts_with("__"),
        None => false,
    }
}
