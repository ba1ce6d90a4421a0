//! Shared constants for the OTP service.

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:10000";

/// OTP challenge validity (5 minutes)
pub const OTP_TTL_SECS: u64 = 300;

/// Interval between expired-challenge sweeps
pub const SWEEP_INTERVAL_SECS: u64 = 60;

/// Keep-alive ping interval (10 minutes)
pub const KEEPALIVE_INTERVAL_SECS: u64 = 600;

/// Default keep-alive target (the listener service that idles down)
pub const DEFAULT_KEEPALIVE_URL: &str = "https://firebase-listener.onrender.com/";

/// Inclusive lower bound of the OTP code space
pub const OTP_CODE_MIN: u32 = 100_000;

/// Inclusive upper bound of the OTP code space
pub const OTP_CODE_MAX: u32 = 999_999;

/// Brevo transactional email endpoint
pub const DEFAULT_BREVO_API_URL: &str = "https://api.brevo.com/v3/smtp/email";
