//! Placeholder password checksum. NOT a password hash: it is deterministic, unsalted and
//! trivially reversible, and exists only so the directory never holds raw passwords.

/// `hashed_<sum of code points × 42>`.
pub fn placeholder_checksum(password: &str) -> String {
    let sum: u64 = password.chars().map(|c| c as u64).sum();
    format!("hashed_{}", sum * 42)
}

pub fn verify_checksum(password: &str, checksum: &str) -> bool {
    placeholder_checksum(password) == checksum
}
