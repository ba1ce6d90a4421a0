//! Email delivery backends.
//!
//! Delivery is a collaborator, not part of the OTP lifecycle: a failed send
//! leaves the issued challenge stored and valid.

mod brevo;
mod smtp;

pub use brevo::BrevoMailer;
pub use smtp::SmtpMailer;

use anyhow::Result;

use otpd_common::OtpError;

use crate::config::{EmailConfig, MailProvider};

/// Email delivery backend, selected by `[email].provider`
pub enum Mailer {
    /// Brevo transactional email HTTP API
    Brevo(BrevoMailer),
    /// Authenticated SMTP relay
    Smtp(SmtpMailer),
    /// Log the code instead of delivering it
    Log,
}

impl Mailer {
    /// Build the configured backend
    pub fn from_config(config: &EmailConfig, http: reqwest::Client) -> Result<Self> {
        match config.provider {
            MailProvider::Brevo => Ok(Self::Brevo(BrevoMailer::new(config, http)?)),
            MailProvider::Smtp => Ok(Self::Smtp(SmtpMailer::new(config)?)),
            MailProvider::Log => Ok(Self::Log),
        }
    }

    /// Deliver `code` to `to`
    pub async fn send_code(&self, to: &str, code: &str) -> Result<(), OtpError> {
        match self {
            Self::Brevo(mailer) => mailer.send_code(to, code).await,
            Self::Smtp(mailer) => mailer.send_code(to, code).await,
            Self::Log => {
                tracing::info!(to = %to, code = %code, "Mail delivery disabled, logging OTP");
                Ok(())
            }
        }
    }
}

/// Message body shared by every backend
pub(crate) fn code_body(code: &str) -> String {
    format!(
        "Your OTP code is: {}. It will expire in 5 minutes.",
        code
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmailConfig;

    #[test]
    fn test_body_names_the_expiry_window() {
        let body = code_body("123456");
        assert_eq!(body, "Your OTP code is: 123456. It will expire in 5 minutes.");
    }

    #[test]
    fn test_brevo_requires_api_key() {
        let config = EmailConfig {
            provider: MailProvider::Brevo,
            ..EmailConfig::default()
        };
        let result = Mailer::from_config(&config, reqwest::Client::new());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_log_backend_always_succeeds() {
        let mailer = Mailer::Log;
        assert!(mailer.send_code("a@x.com", "123456").await.is_ok());
    }
}
