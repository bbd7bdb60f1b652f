//! `gasdeskd`: the cylinder inventory server.
//!
//! Usage:
//!   gasdeskd -c <context-name-or-path> [--listen <addr>] [--db <path>]
//!
//! The context name resolves to `/etc/gasdesk/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cylinder::CylinderModule;
use gasdesk_core::{AllowAll, Authenticator};
use tracing::{info, warn};

use auth_middleware::JwtAuthenticator;
use config::ServerConfig;

/// GasDesk cylinder inventory server.
#[derive(Parser, Debug)]
#[command(name = "gasdeskd", about = "GasDesk cylinder inventory server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Override the redb database path (default: {data_dir}/data.redb).
    #[arg(long = "db")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    bootstrap::verify_config(&server_config)?;

    let service = bootstrap::service_config(&server_config, cli.db, cli.listen);
    let kv = bootstrap::open_store(&server_config, &service)?;

    let cylinder_module = CylinderModule::new(kv);
    info!("Cylinder module initialized");

    let authenticator: Arc<dyn Authenticator> = if server_config.auth.required {
        Arc::new(JwtAuthenticator::new(&server_config.jwt.secret))
    } else {
        warn!("Authentication disabled; all requests run as anonymous");
        Arc::new(AllowAll)
    };

    let app = routes::build_router(authenticator, &[&cylinder_module]);

    let listener = tokio::net::TcpListener::bind(&service.listen).await?;
    info!("GasDesk server listening on {}", service.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
