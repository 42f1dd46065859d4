use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Content-addressed name for a media payload, e.g. `img-9f86d081884c7d65.png`.
pub fn content_addressed_name(prefix: &str, bytes: &[u8], extension: &str) -> String {
    let digest = sha256_hex(bytes);
    format!("{}-{}.{}", prefix, &digest[..16], extension.to_ascii_lowercase())
}
