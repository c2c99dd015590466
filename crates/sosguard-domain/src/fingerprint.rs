use sha2::{Digest, Sha256};

/// Stable SHA-256 fingerprint for a check finding.
///
/// Identity fields: check_id, code, message. The bundle is not part of it.
pub fn fingerprint_for_check(check_id: &str, code: &str, message: &str) -> String {
    let canonical = [check_id, code, message].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
