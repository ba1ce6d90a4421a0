//! Brevo transactional email API client.

use anyhow::{Result, bail};
use serde_json::json;

use otpd_common::OtpError;

use super::code_body;
use crate::config::EmailConfig;

/// Sends OTP mail through the Brevo `smtp/email` endpoint
pub struct BrevoMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    sender_email: String,
    sender_name: String,
    subject: String,
}

impl BrevoMailer {
    pub fn new(config: &EmailConfig, http: reqwest::Client) -> Result<Self> {
        if config.brevo_api_key.is_empty() {
            bail!("BREVO_API_KEY is not set");
        }

        Ok(Self {
            http,
            api_url: config.brevo_api_url.clone(),
            api_key: config.brevo_api_key.clone(),
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
            subject: config.subject.clone(),
        })
    }

    pub async fn send_code(&self, to: &str, code: &str) -> Result<(), OtpError> {
        let payload = json!({
            "sender": { "email": self.sender_email, "name": self.sender_name },
            "to": [{ "email": to }],
            "subject": self.subject,
            "textContent": code_body(code),
        });

        let response = self
            .http
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| OtpError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "❌ Brevo rejected the message");
            return Err(OtpError::Delivery(format!("Brevo returned {}", status)));
        }

        tracing::debug!(to = %to, "OTP mail handed to Brevo");
        Ok(())
    }
}
