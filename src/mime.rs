use std::path::Path;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

static MIME_TYPES: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("html", "text/html; charset=utf-8"),
        ("htm", "text/html; charset=utf-8"),
        ("js", "text/javascript; charset=utf-8"),
        ("css", "text/css; charset=utf-8"),
        ("json", "application/json; charset=utf-8"),
        ("txt", "text/plain; charset=utf-8"),
        ("svg", "image/svg+xml"),
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("gif", "image/gif"),
        ("ico", "image/x-icon"),
        ("wasm", "application/wasm"),
        ("woff", "font/woff"),
        ("woff2", "font/woff2"),
    ]
    .iter()
    .cloned()
    .collect()
});

/// MIME type for an embeddable file, or `None` when the extension is not on
/// the allow-list. Files without an extension (including dotfiles such as
/// `.html`) are never embedded.
pub fn mime_for(file_name: &Path) -> Option<&'static str> {
    let extension = file_name.extension()?.to_str()?;
    MIME_TYPES
        .get(extension.to_ascii_lowercase().as_str())
        .copied()
}
