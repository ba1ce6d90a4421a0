//! Common error types for the OTP service.

use thiserror::Error;

/// Errors surfaced by the OTP service.
///
/// `NotFound`, `Expired` and `Mismatch` are the three expected outcomes of a
/// redeem attempt; their display strings are exactly what the HTTP layer
/// returns to clients, so they must never be conflated or reworded.
#[derive(Debug, Error)]
pub enum OtpError {
    /// No challenge outstanding for this identity
    #[error("No OTP sent to this email")]
    NotFound,

    /// Challenge existed but is past its deadline (evicted on detection)
    #[error("OTP expired")]
    Expired,

    /// Challenge is live but the submitted code does not match
    #[error("Invalid OTP")]
    Mismatch,

    /// Request is missing a required field
    #[error("{0}")]
    MissingField(&'static str),

    /// Email delivery failed (detail goes to the log, not the client)
    #[error("Failed to send OTP")]
    Delivery(String),

    /// Identity-provider password reset failed
    #[error("Failed to reset password")]
    PasswordReset(String),

    /// Internal server error
    #[error("Internal server error")]
    Internal(String),
}

impl OtpError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 400,
            Self::Expired => 400,
            Self::Mismatch => 400,
            Self::MissingField(_) => 400,
            Self::Delivery(_) => 500,
            Self::PasswordReset(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if the client can fix this by changing the request
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
