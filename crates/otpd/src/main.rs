//! # otpd - Email OTP Service
//!
//! Issues one-time passcodes over email and verifies them. Two routes do
//! the real work (`/send-otp`, `/verify-otp`); background workers sweep
//! expired challenges and keep a dependent listener service warm.
//!
//! ## Architecture
//! ```text
//! Client → otpd → Mailer (Brevo API / SMTP)
//!            ↓
//!        OtpStore (in-memory, per-email challenges)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod accounts;
mod config;
mod keepalive;
mod mailer;
mod otp;
mod routes;
mod state;

use config::AppConfig;
use state::AppState;

/// Email OTP service
#[derive(Parser, Debug)]
#[command(name = "otpd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/otpd.toml")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Keep-alive target URL (overrides config)
    #[arg(long, env = "KEEPALIVE_URL")]
    keepalive_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("🔐 Starting otpd v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;
    info!("📋 Configuration loaded from {}", args.config);

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    // Initialize application state
    let state = AppState::new(config.clone())?;
    info!("✉️  Mail delivery via {}", config.email.provider);

    // Spawn expired-challenge sweeper
    let sweep_store = state.store.clone();
    let sweep_shutdown = shutdown_tx.subscribe();
    let sweep_interval = config.otp.sweep_interval_secs;
    tokio::spawn(async move {
        otp::sweeper_worker(sweep_store, sweep_interval, sweep_shutdown).await;
    });

    // Spawn keep-alive pinger
    if config.keepalive.enabled {
        let ping_client = state.http.clone();
        let ping_config = config.keepalive.clone();
        let ping_shutdown = shutdown_tx.subscribe();
        tokio::spawn(async move {
            keepalive::keepalive_worker(ping_client, ping_config, ping_shutdown).await;
        });
    }

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("🚀 otpd listening on {}", config.listen_addr);

    // Handle graceful shutdown
    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("🛑 Shutdown signal received");
        let _ = shutdown_tx.send(());
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("👋 otpd shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
