//! OTP code generation.

use rand::Rng;

use otpd_common::constants::{OTP_CODE_MAX, OTP_CODE_MIN};

/// Generate a random 6-digit code.
///
/// The code space is 100000-999999 inclusive, matching the deployed
/// generator: codes with a leading zero are never produced. The generated
/// string always has exactly six digits.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    rng.random_range(OTP_CODE_MIN..=OTP_CODE_MAX).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_shape() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            // No leading zeros in this code space
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn test_code_in_range() {
        for _ in 0..1000 {
            let value: u32 = generate_code().parse().expect("numeric code");
            assert!((OTP_CODE_MIN..=OTP_CODE_MAX).contains(&value));
        }
    }
}
