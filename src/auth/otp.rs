use chrono::{DateTime, Duration, FixedOffset, Utc};
use rand::Rng;

pub const OTP_TTL_MINUTES: i64 = 10;

/// Six-digit one-time password for the forgot-password flow.
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{code:06}")
}

pub fn otp_expiry() -> DateTime<FixedOffset> {
    (Utc::now() + Duration::minutes(OTP_TTL_MINUTES)).fixed_offset()
}

pub fn otp_expired(expiry: &DateTime<FixedOffset>) -> bool {
    *expiry < Utc::now().fixed_offset()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{generate_otp, otp_expired, otp_expiry};

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..32 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn expiry_is_in_the_future_and_detected_when_past() {
        assert!(!otp_expired(&otp_expiry()));
        let past = (Utc::now() - Duration::minutes(1)).fixed_offset();
        assert!(otp_expired(&past));
    }
}
