//! HTTP route handlers for otpd.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use otpd_common::OtpError;

use crate::state::AppState;

mod health;
mod otp;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // OTP endpoints
        .route("/send-otp", post(otp::send_otp))
        .route("/verify-otp", post(otp::verify_otp))

        // Health & liveness
        .route("/ping", get(health::ping))
        .route("/health", get(health::health_check))

        // Middleware (clients are browsers on other origins)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())

        // Add shared state
        .with_state(state)
}

/// Uniform error-to-response translation at the HTTP boundary.
///
/// Every handler returns `Result<_, ApiError>`; the taxonomy's display
/// string becomes the `error` field and `status_code()` picks the status,
/// so no route carries its own error mapping.
pub struct ApiError(pub OtpError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(ErrorBody {
            error: self.0.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<OtpError> for ApiError {
    fn from(err: OtpError) -> Self {
        Self(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_redeem_errors_become_400_with_exact_messages() {
        for (err, message) in [
            (OtpError::NotFound, "No OTP sent to this email"),
            (OtpError::Expired, "OTP expired"),
            (OtpError::Mismatch, "Invalid OTP"),
        ] {
            let response = ApiError(err).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = body_json(response).await;
            assert_eq!(body["error"], message);
        }
    }

    #[tokio::test]
    async fn test_delivery_failure_becomes_500() {
        let response = ApiError(OtpError::Delivery("smtp 550".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to send OTP");
    }

    #[tokio::test]
    async fn test_missing_field_carries_its_own_message() {
        let response =
            ApiError(OtpError::MissingField("Email is required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Email is required");
    }
}
