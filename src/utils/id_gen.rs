//! ID generation utilities
//!
//! IDs are timestamp-based so records written by earlier releases keep
//! sorting correctly next to new ones.

use chrono::Utc;
use rand::Rng;

/// Characters used for the random part of user IDs
const ID_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a random base36 string of specified length
pub fn generate_suffix(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..ID_CHARS.len());
            ID_CHARS[idx] as char
        })
        .collect()
}

/// Generate a user ID: `u_<unix millis>_<9 random base36 chars>`
pub fn generate_user_id() -> String {
    format!(
        "u_{}_{}",
        Utc::now().timestamp_millis(),
        generate_suffix(crate::USER_ID_SUFFIX_LENGTH)
    )
}

/// Generate a record ID from the current time in unix milliseconds.
///
/// Used for test results, activity logs and chat messages.
pub fn generate_timestamp_id() -> String {
    Utc::now().timestamp_millis().to_string()
}
