use anyhow::{Context, Result};
use dotenv::dotenv;
use std::env;
use tracing_subscriber::fmt;

/// Deployment configuration for the pipeline. Constructed explicitly and
/// handed to `container::new`; nothing else in the crate reads the process
/// environment.
pub struct Settings {
    env: String,
    region: String,
    bucket: String,
    endpoint: String,
    storage_external_url: String,
}

impl Settings {
    pub fn new(
        env: String,
        region: String,
        bucket: String,
        endpoint: String,
        storage_external_url: String,
    ) -> Settings {
        Settings {
            env,
            region,
            bucket,
            endpoint,
            storage_external_url,
        }
    }

    pub fn env(&self) -> String {
        self.env.clone()
    }

    pub fn is_dev(&self) -> bool {
        self.env() == "dev"
    }

    pub fn region(&self) -> String {
        self.region.clone()
    }

    pub fn bucket(&self) -> String {
        self.bucket.clone()
    }

    pub fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    pub fn storage_external_url(&self) -> String {
        self.storage_external_url.clone()
    }
}

/// Convenience loader for deployments configured through the environment
/// (a `.env` file is honored in dev).
pub fn from_env() -> Result<Settings> {
    dotenv().ok();

    Ok(Settings {
        env: env::var("ENV").context("ENV is not set")?,
        region: env::var("REGION").context("REGION is not set")?,
        bucket: env::var("BUCKET").context("BUCKET is not set")?,
        endpoint: env::var("ENDPOINT").context("ENDPOINT is not set")?,
        storage_external_url: env::var("STORAGE_EXTERNAL_URL")
            .context("STORAGE_EXTERNAL_URL is not set")?,
    })
}

pub fn init_tracing(settings: &Settings) {
    let subscriber_builder = fmt().with_target(false);

    if settings.is_dev() {
        subscriber_builder
            .compact()
            .with_max_level(tracing::Level::INFO)
            .init();
    } else {
        subscriber_builder
            .json()
            .with_max_level(tracing::Level::INFO)
            .init();
    }
}
