//! OTP lifecycle: generation, storage, expiry, single-use redemption.

mod generator;
mod store;
mod sweeper;

pub use generator::generate_code;
pub use store::{OtpStore, StoreStats};
pub use sweeper::sweeper_worker;
