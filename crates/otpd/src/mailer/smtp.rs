//! SMTP delivery via lettre.

use anyhow::{Context, Result, bail};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use otpd_common::OtpError;

use super::code_body;
use crate::config::EmailConfig;

/// Sends OTP mail through an authenticated SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    subject: String,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        if config.smtp_host.is_empty() {
            bail!("smtp_host is not configured");
        }

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .context("Failed to create SMTP transport")?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .port(config.smtp_port)
            .build();

        Ok(Self {
            transport,
            from: format!("{} <{}>", config.sender_name, config.sender_email),
            subject: config.subject.clone(),
        })
    }

    pub async fn send_code(&self, to: &str, code: &str) -> Result<(), OtpError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| OtpError::Delivery(format!("Invalid sender address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| OtpError::Delivery(format!("Invalid recipient address: {}", e)))?)
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(code_body(code))
            .map_err(|e| OtpError::Delivery(format!("Failed to build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| OtpError::Delivery(e.to_string()))?;

        tracing::debug!(to = %to, "OTP mail handed to SMTP relay");
        Ok(())
    }
}
