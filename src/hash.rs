//! Password hashing functionality
//!
//! Implements the legacy rolling hash so stores written by earlier
//! releases keep verifying. This is an obfuscation scheme, not real
//! cryptography: the app runs single-tenant on the user's own device
//! and the store never leaves it.

/// Prefix marking a hashed password value.
const HASH_PREFIX: &str = "hashed_";

/// Hash a password with the legacy rolling hash.
///
/// The input is walked as UTF-16 code units (surrogate halves count
/// separately) and folded into a signed 32-bit accumulator with
/// wrapping arithmetic:
///
/// ```text
/// hash = (hash << 5) - hash + unit
/// ```
///
/// The result is `hashed_` followed by the absolute value in lowercase
/// hex. The empty string hashes to `"0"` with no prefix.
///
/// # Example
/// ```
/// use avtocore::hash::hash_password;
///
/// assert_eq!(hash_password("12345"), "hashed_2ca0033");
/// assert_eq!(hash_password(""), "0");
/// ```
pub fn hash_password(password: &str) -> String {
    if password.is_empty() {
        return "0".to_string();
    }

    let mut hash: i32 = 0;
    for unit in password.encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(unit as i32);
    }

    format!("{}{:x}", HASH_PREFIX, hash.unsigned_abs())
}

/// Check a candidate password against a stored password value.
///
/// Matches either the hash of the candidate or, for accounts created
/// before hashing was introduced, the stored plaintext itself.
///
/// # Arguments
/// * `candidate` - Password entered by the user
/// * `stored` - Value kept in the user record
pub fn verify_password(candidate: &str, stored: &str) -> bool {
    stored == hash_password(candidate) || stored == candidate
}
