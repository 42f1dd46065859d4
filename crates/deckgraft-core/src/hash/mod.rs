pub mod sha256;

pub use sha256::{content_addressed_name, sha256_hex};
