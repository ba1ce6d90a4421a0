//! Application state and shared resources.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::accounts::PasswordResetClient;
use crate::config::AppConfig;
use crate::mailer::Mailer;
use crate::otp::OtpStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Pending OTP challenges, keyed by email address
    pub store: Arc<OtpStore>,

    /// Email delivery backend
    pub mailer: Arc<Mailer>,

    /// Identity-provider password reset (None unless configured)
    pub password_reset: Option<Arc<PasswordResetClient>>,

    /// Shared outbound HTTP client (keep-alive, Brevo, identity provider)
    pub http: reqwest::Client,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        let store = Arc::new(OtpStore::new(config.otp.ttl_secs));
        let mailer = Arc::new(Mailer::from_config(&config.email, http.clone())?);
        let password_reset = config
            .password_reset
            .as_ref()
            .map(|cfg| Arc::new(PasswordResetClient::new(cfg.clone(), http.clone())));

        Ok(Self {
            config,
            store,
            mailer,
            password_reset,
            http,
        })
    }
}
