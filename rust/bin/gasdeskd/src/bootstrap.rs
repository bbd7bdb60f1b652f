//! Startup checks and storage initialisation.

use std::path::PathBuf;
use std::sync::Arc;

use gasdesk_core::ServiceConfig;
use gasdesk_kv::{KVStore, MemoryStore, RedbStore};
use tracing::{info, warn};

use crate::config::{Backend, ServerConfig};

/// Verify server configuration is usable before anything is opened.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.auth.required && config.jwt.secret.is_empty() {
        anyhow::bail!(
            "JWT secret is empty but auth is required.\n\
             Set [jwt] secret, or [auth] required = false for local development."
        );
    }
    if config.storage.backend == Backend::Redb && config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

/// Combine the config file with CLI overrides into the runtime settings.
pub fn service_config(
    config: &ServerConfig,
    db_override: Option<PathBuf>,
    listen: String,
) -> ServiceConfig {
    let data_dir = (!config.storage.data_dir.is_empty())
        .then(|| PathBuf::from(&config.storage.data_dir));
    ServiceConfig {
        data_dir,
        db_path: db_override,
        listen,
    }
}

/// Open the configured KV backend.
pub fn open_store(
    config: &ServerConfig,
    service: &ServiceConfig,
) -> anyhow::Result<Arc<dyn KVStore>> {
    match config.storage.backend {
        Backend::Memory => {
            warn!("Using in-memory storage; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        Backend::Redb => {
            if let Some(data_dir) = &service.data_dir {
                std::fs::create_dir_all(data_dir)?;
            }
            let path = service.resolve_db_path();
            let store = RedbStore::open(&path)
                .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?;
            info!("KV store opened at {}", path.display());
            Ok(Arc::new(store))
        }
    }
}
