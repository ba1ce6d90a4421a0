//! OTP issue and verification endpoints.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use otpd_common::OtpError;

use super::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendOtpRequest {
    email: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    email: Option<String>,
    otp: Option<String>,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    success: bool,
}

/// Issue a challenge and hand the code to the mailer
pub async fn send_otp(
    State(state): State<AppState>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let email = payload
        .email
        .filter(|email| !email.is_empty())
        .ok_or(OtpError::MissingField("Email is required"))?;

    let code = state.store.issue(&email).await;

    // A delivery failure leaves the challenge stored and valid
    if let Err(e) = state.mailer.send_code(&email, &code).await {
        tracing::error!(email = %email, error = ?e, "❌ Email sending failed");
        return Err(e.into());
    }

    tracing::info!(email = %email, "OTP issued and delivered");

    Ok(Json(SuccessResponse { success: true }))
}

/// Redeem a submitted code against the pending challenge
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (email, otp) = match (
        payload.email.filter(|email| !email.is_empty()),
        payload.otp.filter(|otp| !otp.is_empty()),
    ) {
        (Some(email), Some(otp)) => (email, otp),
        _ => return Err(OtpError::MissingField("Email and OTP are required").into()),
    };

    state.store.redeem(&email, &otp).await?;

    tracing::info!(email = %email, "OTP verified");

    // One deployment also rotates the account password after verification;
    // the challenge is already consumed whether or not this succeeds
    if let Some(ref reset) = state.password_reset {
        reset.reset(&email).await?;
    }

    Ok(Json(SuccessResponse { success: true }))
}
