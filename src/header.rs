//! Per-asset header blocks.
//!
//! A header block is a run of complete `Name: value\r\n` lines that is copied
//! verbatim into every response for its asset. Callers that only have a MIME
//! type can pass that instead; [`response_headers`] expands it.

use std::borrow::Cow;

use crate::digest::ETAG_LEN;
use crate::request::{find_ignore_ascii_case, slice_between_ignore_ascii_case};

/// How an asset's bytes are stored in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    Identity,
}

/// Build the canonical compile-time header block for one asset.
pub fn asset_header_block(etag: &str, encoding: Encoding, mime: &str) -> String {
    let mut block = String::with_capacity(96 + mime.len());
    block.push_str("ETag: \"");
    block.push_str(etag);
    block.push_str("\"\r\n");
    if encoding == Encoding::Gzip {
        block.push_str("Content-Encoding: gzip\r\n");
    }
    block.push_str("Content-Type: ");
    block.push_str(mime);
    block.push_str("\r\n");
    block
}

/// The 40-character ETag token carried by a header block, if any.
///
/// Blocks with a missing, unterminated or differently sized ETag yield
/// `None`, which disables conditional handling for that asset.
pub fn etag_token(block: &str) -> Option<&str> {
    let value = slice_between_ignore_ascii_case(block.as_bytes(), b"etag: \"", b"\"")?;
    if value.len() != ETAG_LEN {
        return None;
    }
    std::str::from_utf8(value).ok()
}

/// Expand caller-supplied headers into the lines placed between the status
/// line and `Content-Length`.
///
/// * full header lines (ending in CRLF) that already carry an `ETag` or
///   `Cache-Control` are used as is;
/// * other full header lines get `Cache-Control: no-cache` in front;
/// * a bare MIME type becomes `Cache-Control` + `Content-Type` lines.
pub fn response_headers(content_type: Option<&str>) -> Cow<'_, str> {
    let content_type = content_type.unwrap_or("text/plain; charset=utf-8");
    if content_type.ends_with("\r\n") {
        let bytes = content_type.as_bytes();
        if find_ignore_ascii_case(bytes, b"etag:").is_some()
            || find_ignore_ascii_case(bytes, b"cache-control:").is_some()
        {
            Cow::Borrowed(content_type)
        } else {
            Cow::Owned(format!("Cache-Control: no-cache\r\n{}", content_type))
        }
    } else {
        Cow::Owned(format!(
            "Cache-Control: no-cache\r\nContent-Type: {}\r\n",
            content_type
        ))
    }
}
