use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Build-time failures. Every variant is fatal to a compiler run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to open directory {path}: {source}")]
    OpenDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to compress {path}: {source}")]
    Compress {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is {size} bytes after compression, larger than a u32 size field")]
    TooLarge { path: PathBuf, size: usize },

    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures while assembling an HTTP response. The connection is dropped
/// instead of sending anything.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("response head needs {needed} bytes, limit is {limit}")]
    HeaderOverflow { needed: usize, limit: usize },
}

/// A request that looked like a WebSocket upgrade but could not be accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("handshake request is incomplete")]
    Incomplete,

    #[error("handshake must use GET, not {0}")]
    BadMethod(String),

    #[error("missing or invalid {0} header")]
    BadHeader(&'static str),

    #[error("unsupported WebSocket version {0:?}")]
    UnsupportedVersion(String),
}
