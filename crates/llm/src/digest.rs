use sha2::{Digest, Sha256};

pub const DIGEST_PREFIX: &str = "sha256:";

/// SHA-256 of the raw bytes → `"sha256:<64 hex>"`.
pub fn digest(bytes: &[u8]) -> String {
    let result = Sha256::digest(bytes);
    format!("{DIGEST_PREFIX}{:x}", result)
}

/// True for a well-formed `sha256:` digest (lowercase hex).
pub fn is_digest(s: &str) -> bool {
    match s.strip_prefix(DIGEST_PREFIX) {
        Some(hex) => hex.len() == 64 && hex.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')),
        None => false,
    }
}
