use std::sync::Arc;

use crate::settings::Settings;
use crate::usecases::gateways::{Storage, Transcoder};
use crate::usecases::ingest::IngestMedia;
use crate::usecases::remove::RemoveMedia;
use crate::{gateways, usecases};

pub struct Container {
    pub settings: Arc<Settings>,
    pub storage: Arc<dyn Storage>,
    pub ingest_media: Arc<IngestMedia>,
    pub remove_media: Arc<RemoveMedia>,
}

pub async fn new(settings: Settings) -> Container {
    let settings = Arc::new(settings);
    let storage: Arc<dyn Storage> = Arc::new(gateways::s3::new(settings.clone()).await);
    let transcoder: Arc<dyn Transcoder> = Arc::new(gateways::images::new());
    let ingest_media = Arc::new(usecases::ingest::new(storage.clone(), transcoder));
    let remove_media = Arc::new(usecases::remove::new(storage.clone()));

    Container {
        settings,
        storage,
        ingest_media,
        remove_media,
    }
}
