use chrono::{DateTime, Utc};
use rand::Rng;

/// Booking references look like `BK1718035200123042`: the creation time in
/// milliseconds followed by three random digits.
pub fn generate_booking_id(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("BK{}{:03}", now.timestamp_millis(), suffix)
}

/// Six digit code for phone verification, zero padded.
pub fn generate_confirmation_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_booking_id_format() {
        let now = Utc.timestamp_millis_opt(1_718_035_200_123).unwrap();
        let id = generate_booking_id(now);
        assert!(id.starts_with("BK1718035200123"));
        assert_eq!(id.len(), "BK".len() + 13 + 3);
        assert!(id[2..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_confirmation_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_confirmation_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
