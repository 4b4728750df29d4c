use sha1::{Digest, Sha1};

/// Length of a rendered content digest: 160 bits as hex.
pub const ETAG_LEN: usize = 40;

/// Content digest of the raw (uncompressed) bytes, as 40 lowercase hex
/// characters. Comparisons against client tokens are case-insensitive.
pub fn content_etag(raw: &[u8]) -> String {
    format!("{:x}", Sha1::digest(raw))
}
