use chrono::Utc;
use uuid::Uuid;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate an opaque ID: base-36 millisecond timestamp followed by a
/// base-36 random suffix. Unique within a session for practical purposes.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    // 52 random bits keeps the suffix at 10-11 characters
    let random = (Uuid::new_v4().as_u128() as u64) & ((1u64 << 52) - 1);
    format!("{}{}", to_base36(millis), to_base36(random))
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
