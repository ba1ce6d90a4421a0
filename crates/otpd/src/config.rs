//! Configuration management for otpd.
//!
//! Secrets (BREVO_API_KEY, SMTP_PASSWORD, IDENTITY_API_KEY) only ever come
//! from the environment; the config file carries everything else.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

use otpd_common::constants::{
    DEFAULT_BREVO_API_URL, DEFAULT_KEEPALIVE_URL, DEFAULT_LISTEN_ADDR, KEEPALIVE_INTERVAL_SECS,
    OTP_TTL_SECS, SWEEP_INTERVAL_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// OTP lifecycle configuration
    #[serde(default)]
    pub otp: OtpConfig,

    /// Email delivery configuration
    #[serde(default)]
    pub email: EmailConfig,

    /// Keep-alive pinger configuration
    #[serde(default)]
    pub keepalive: KeepaliveConfig,

    /// Identity-provider password reset (disabled when the section is absent)
    #[serde(default)]
    pub password_reset: Option<PasswordResetConfig>,
}

/// OTP lifecycle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    /// Challenge validity in seconds
    #[serde(default = "default_otp_ttl")]
    pub ttl_secs: u64,

    /// Seconds between expired-challenge sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_otp_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Email delivery backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Brevo transactional email HTTP API
    Brevo,
    /// Authenticated SMTP relay
    Smtp,
    /// Log the code instead of sending it (local runs, tests)
    Log,
}

impl fmt::Display for MailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brevo => write!(f, "brevo"),
            Self::Smtp => write!(f, "smtp"),
            Self::Log => write!(f, "log"),
        }
    }
}

/// Email delivery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Which backend delivers the code
    #[serde(default = "default_provider")]
    pub provider: MailProvider,

    /// Sender address (must be verified with the provider)
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Sender display name
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Message subject line
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Brevo API endpoint
    #[serde(default = "default_brevo_api_url")]
    pub brevo_api_url: String,

    /// Brevo API key (BREVO_API_KEY)
    #[serde(skip)]
    pub brevo_api_key: String,

    /// SMTP relay host
    #[serde(default)]
    pub smtp_host: String,

    /// SMTP relay port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username
    #[serde(default)]
    pub smtp_username: String,

    /// SMTP password (SMTP_PASSWORD)
    #[serde(skip)]
    pub smtp_password: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            subject: default_subject(),
            brevo_api_url: default_brevo_api_url(),
            brevo_api_key: String::new(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
        }
    }
}

/// Keep-alive pinger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KeepaliveConfig {
    /// Enable the background pinger
    #[serde(default = "default_keepalive_enabled")]
    pub enabled: bool,

    /// Target URL
    #[serde(default = "default_keepalive_url")]
    pub url: String,

    /// Seconds between pings
    #[serde(default = "default_keepalive_interval")]
    pub interval_secs: u64,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            enabled: default_keepalive_enabled(),
            url: default_keepalive_url(),
            interval_secs: default_keepalive_interval(),
        }
    }
}

/// Identity-provider password reset configuration.
///
/// Every verified account is reset to the same `temp_password` - a known
/// limitation kept for compatibility with the existing client flow.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetConfig {
    /// Identity-toolkit base URL (accounts:lookup / accounts:update)
    pub api_url: String,

    /// API key (IDENTITY_API_KEY)
    #[serde(skip)]
    pub api_key: String,

    /// The fixed temporary password set after verification
    pub temp_password: String,
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_otp_ttl() -> u64 { OTP_TTL_SECS }
fn default_sweep_interval() -> u64 { SWEEP_INTERVAL_SECS }
fn default_provider() -> MailProvider { MailProvider::Log }
fn default_sender_email() -> String { "car00ilchange@gmail.com".to_string() }
fn default_sender_name() -> String { "CarOil App".to_string() }
fn default_subject() -> String { "🔐 Your OTP for Signup Verification".to_string() }
fn default_brevo_api_url() -> String { DEFAULT_BREVO_API_URL.to_string() }
fn default_smtp_port() -> u16 { 587 }
fn default_keepalive_enabled() -> bool { true }
fn default_keepalive_url() -> String { DEFAULT_KEEPALIVE_URL.to_string() }
fn default_keepalive_interval() -> u64 { KEEPALIVE_INTERVAL_SECS }

impl AppConfig {
    /// Load configuration from file, with CLI and environment overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config: Self = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref url) = args.keepalive_url {
            config.keepalive.url = url.clone();
        }

        // Secrets come from the environment, never the config file
        if let Ok(key) = std::env::var("BREVO_API_KEY") {
            config.email.brevo_api_key = key;
        }
        if let Ok(password) = std::env::var("SMTP_PASSWORD") {
            config.email.smtp_password = password;
        }
        if let Some(ref mut reset) = config.password_reset {
            if let Ok(key) = std::env::var("IDENTITY_API_KEY") {
                reset.api_key = key;
            }
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            otp: OtpConfig::default(),
            email: EmailConfig::default(),
            keepalive: KeepaliveConfig::default(),
            password_reset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:10000");
        assert_eq!(config.otp.ttl_secs, 300);
        assert_eq!(config.keepalive.interval_secs, 600);
        assert!(config.keepalive.enabled);
        assert_eq!(config.email.provider, MailProvider::Log);
        assert!(config.password_reset.is_none());
    }

    #[test]
    fn test_provider_parses_lowercase() {
        let email: EmailConfig =
            serde_json::from_str(r#"{"provider": "brevo"}"#).expect("valid config");
        assert_eq!(email.provider, MailProvider::Brevo);
        assert_eq!(email.brevo_api_url, DEFAULT_BREVO_API_URL);
    }
}
