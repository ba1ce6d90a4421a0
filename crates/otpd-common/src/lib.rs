//! # OTPD Common
//!
//! Shared error taxonomy and constants for the OTP service.
//!
//! ## Modules
//! - `error` - The service error enum and its HTTP status mapping
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;

pub use error::OtpError;
