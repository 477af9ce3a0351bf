mod client;
pub mod form;
mod local;
pub mod staging;
pub mod submit;
pub mod types;

pub use client::ApiClient;
pub use local::LocalStore;

use self::types::{CreateThreadParams, StagedFile, UploadedFile};
use crate::config::{BackendConfig, Config};
use async_trait::async_trait;
use color_eyre::Result;
use std::sync::Arc;

#[async_trait]
pub trait Upload: Send + Sync {
    /// Upload a batch of files. The response has one entry per uploaded file.
    async fn upload(&self, files: Vec<StagedFile>) -> Result<Vec<UploadedFile>>;
}

#[async_trait]
pub trait Persist: Send + Sync {
    async fn create_thread(&self, params: CreateThreadParams) -> Result<()>;
}

#[derive(Clone)]
pub struct Backend {
    pub uploader: Arc<dyn Upload>,
    pub store: Arc<dyn Persist>,
    pub concurrency: usize,
}

impl Backend {
    pub fn new(uploader: Arc<dyn Upload>, store: Arc<dyn Persist>, concurrency: usize) -> Self {
        Self {
            uploader,
            store,
            concurrency: concurrency.max(1),
        }
    }
    pub fn from_config(config: &Config) -> Result<Self> {
        let concurrency = config.upload.concurrency;
        Ok(match &config.backend {
            BackendConfig::Http { endpoint, token } => {
                let client = Arc::new(ApiClient::new(endpoint, token.clone())?);
                Self::new(client.clone(), client, concurrency)
            }
            BackendConfig::Local { dir } => {
                let dir = match dir {
                    Some(dir) => dir.clone(),
                    None => crate::utils::get_data_dir()?,
                };
                let store = Arc::new(LocalStore::new(dir));
                Self::new(store.clone(), store, concurrency)
            }
        })
    }
}
