//! Pagewarden Kernel
//!
//! HTTP server and offline access tools.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pagewarden_kernel::cli::{self, Cli, Command};
use pagewarden_kernel::config::Config;
use pagewarden_kernel::routes;
use pagewarden_kernel::session;
use pagewarden_kernel::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Menu {
            access,
            menu_file,
            json,
        } => {
            println!("{}", cli::cmd_menu(&access, menu_file.as_ref(), json)?);
            Ok(())
        }
        Command::Check { path, access } => {
            println!("{}", cli::cmd_check(&path, &access));
            Ok(())
        }
        Command::HashPassword { password } => {
            println!("{}", cli::cmd_hash_password(&password)?);
            Ok(())
        }
    }
}

async fn serve() -> Result<()> {
    info!("Starting Pagewarden kernel");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, "Configuration loaded");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    let cors = routes::cors_layer(&config.cors_allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    // The session store decides the router's concrete type, so each branch
    // builds and serves its own.
    match &config.redis_url {
        Some(redis_url) => {
            let session_layer = session::redis_session_layer(redis_url, &config)
                .await
                .context("failed to create session layer")?;
            info!(%addr, sessions = "redis", "Server listening");
            axum::serve(listener, routes::build_app(state, session_layer, cors))
                .await
                .context("server error")?;
        }
        None => {
            warn!("REDIS_URL not set; sessions are kept in memory");
            let session_layer = session::memory_session_layer(&config);
            info!(%addr, sessions = "memory", "Server listening");
            axum::serve(listener, routes::build_app(state, session_layer, cors))
                .await
                .context("server error")?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    // stderr keeps command output on stdout clean.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
