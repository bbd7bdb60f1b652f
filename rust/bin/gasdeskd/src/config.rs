//! Server configuration file (`/etc/gasdesk/<context>.toml`).
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/gasdesk"
//! backend = "redb"
//!
//! [jwt]
//! secret = "..."
//!
//! [auth]
//! required = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_DIR: &str = "/etc/gasdesk";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,

    #[serde(default)]
    pub jwt: JwtConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Durable, file-backed (redb).
    #[default]
    Redb,
    /// Volatile; contents are lost on restart.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: String,

    #[serde(default)]
    pub backend: Backend,
}

/// Shared secret used to verify session tokens (HS256).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// When false every request is let through as `anonymous`.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required: default_required(),
        }
    }
}

impl ServerConfig {
    /// A bare context name resolves to `/etc/gasdesk/<name>.toml`; anything
    /// containing `/` or `.` is taken as a path.
    pub fn resolve_path(context: &str) -> PathBuf {
        if context.contains('/') || context.contains('.') {
            PathBuf::from(context)
        } else {
            PathBuf::from(CONFIG_DIR).join(format!("{}.toml", context))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/gasdesk/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./dev.toml"),
            PathBuf::from("./dev.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("/opt/gd/x.toml"),
            PathBuf::from("/opt/gd/x.toml")
        );
    }

    #[test]
    fn test_parse_full() {
        let config: ServerConfig = toml::from_str(
            r#"
            [storage]
            data_dir = "/var/lib/gasdesk"
            backend = "memory"

            [jwt]
            secret = "s3cret"

            [auth]
            required = false
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/gasdesk");
        assert_eq!(config.storage.backend, Backend::Memory);
        assert_eq!(config.jwt.secret, "s3cret");
        assert!(!config.auth.required);
    }

    #[test]
    fn test_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [storage]
            data_dir = "/data"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, Backend::Redb);
        assert!(config.jwt.secret.is_empty());
        assert!(config.auth.required);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.toml");
        std::fs::write(&path, "[storage]\ndata_dir = \"/d\"\n[jwt]\nsecret = \"k\"\n").unwrap();
        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.jwt.secret, "k");

        assert!(ServerConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
