use crate::gallery::Gallery;
use crate::store::image_store::{ImageStore, StoreError};
use crate::store::memory_store::MemoryImageStore;
use crate::store::persistent_store::{PersistentImageStore, StorageBackgroundAdapter};
use crate::utils::background::SharedBackgroundService;
use envconfig::Envconfig;
use log::info;
use std::path::Path;
use std::sync::Arc;
use strum::EnumString;

#[derive(Clone, Debug, EnumString, strum::Display, Eq, PartialEq)]
pub enum StorageImplementation {
    InMemory,
    Persistent,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid environment: {0}")]
    Env(#[from] envconfig::Error),
    #[error("failed to open image store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Envconfig)]
pub struct EnvConfig {
    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub host: String,
    #[envconfig(from = "PORT", default = "5000")]
    pub port: u32,

    // ------------------
    // Storage settings
    #[envconfig(from = "STORAGE_IMPLEMENTATION", default = "Persistent")]
    pub storage_implementation: StorageImplementation,
    /// Persistent db location (directory)
    #[envconfig(from = "PERSISTENT_STORAGE_DIR", default = ".gallery-serve")]
    pub persistent_storage_dir: String,
    /// Block cache of the persistent db, in megabytes
    #[envconfig(from = "STORAGE_CACHE_SIZE_MB", default = "64")]
    pub storage_cache_size_mb: u64,

    // ------------------
    // Request settings
    /// Max accepted upload body, in bytes. Payloads are kept in memory and stored inline
    #[envconfig(from = "MAX_UPLOAD_SIZE", default = "16777216")]
    pub max_upload_size: usize,
    /// Client cache (in browser) duration (in seconds) for served images
    #[envconfig(from = "CLIENT_CACHE_TTL", default = "31536000")]
    pub client_cache_ttl: usize,
    #[envconfig(from = "REQUEST_TIMEOUT", default = "30")]
    pub request_timeout: u64,

    /// Enable OpenAPI and Swagger docs routes
    #[envconfig(from = "ENABLE_DOCS", default = "true")]
    pub enable_docs: bool,
}

pub struct Config {
    pub host: String,
    pub port: u32,
    pub gallery: Gallery,
    pub background_services: Vec<SharedBackgroundService>,

    pub max_upload_size: usize,
    pub client_cache_ttl: usize,
    pub request_timeout: u64,
    pub enable_docs: bool,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_env_config(EnvConfig::init_from_env()?)
    }

    pub fn from_env_config(env_conf: EnvConfig) -> Result<Config, ConfigError> {
        info!("Using {} storage", env_conf.storage_implementation);
        let mut background_services: Vec<SharedBackgroundService> = Vec::new();

        let store: Arc<dyn ImageStore + Send + Sync> = match env_conf.storage_implementation {
            StorageImplementation::InMemory => Arc::new(MemoryImageStore::new()),
            StorageImplementation::Persistent => {
                info!(
                    "Opening image store at {}",
                    env_conf.persistent_storage_dir.as_str()
                );
                let store = Arc::new(PersistentImageStore::open(
                    Path::new(env_conf.persistent_storage_dir.as_str()),
                    env_conf.storage_cache_size_mb,
                )?);
                background_services.push(Arc::new(tokio::sync::RwLock::new(
                    StorageBackgroundAdapter::new(store.clone()),
                )));
                store
            }
        };

        Ok(Config {
            host: env_conf.host,
            port: env_conf.port,
            gallery: Gallery::new(store),
            background_services,
            max_upload_size: env_conf.max_upload_size,
            client_cache_ttl: env_conf.client_cache_ttl,
            request_timeout: env_conf.request_timeout,
            enable_docs: env_conf.enable_docs,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
