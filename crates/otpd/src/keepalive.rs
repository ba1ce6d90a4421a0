//! Keep-alive pinger for the dependent listener service.
//!
//! Has no interaction with the OTP store; it only keeps the downstream
//! deployment from idling down between signups.

use std::time::Duration;

use crate::config::KeepaliveConfig;

/// Issue an outbound GET on a fixed interval. Failures are logged and
/// otherwise ignored.
pub async fn keepalive_worker(
    client: reqwest::Client,
    config: KeepaliveConfig,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    tracing::info!(
        url = %config.url,
        interval_secs = config.interval_secs,
        "🔁 Keep-alive pinger started"
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(config.interval_secs)) => {
                match client.get(&config.url).send().await {
                    Ok(response) => {
                        tracing::debug!(status = %response.status(), "Pinged keep-alive target");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "⚠️  Keep-alive ping failed");
                    }
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("🔁 Keep-alive pinger shutting down...");
                break;
            }
        }
    }
}
