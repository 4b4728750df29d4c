//! Telling WebSocket handshakes apart from plain static requests.
//!
//! The first bytes of every connection pass through [`dispatch`]. Anything
//! that does not carry the handshake header is served from the asset table
//! and the connection is closed afterwards. Upgrade attempts go to a
//! [`Handshake`] implementation; the transport owns everything after that.

use tokio_tungstenite::tungstenite::handshake::derive_accept_key;
use tracing::debug;

use crate::error::{HandshakeError, ResponseError};
use crate::registry::AssetRegistry;
use crate::request::{find, find_ignore_ascii_case, RequestHead, HEADER_TERMINATOR};
use crate::resolver::{bad_handshake, resolve};
use crate::response::Response;

/// Header only a WebSocket handshake carries.
pub const HANDSHAKE_HEADER: &[u8] = b"Sec-WebSocket-Key";

/// Fast pre-check: does `request` look like a WebSocket handshake?
pub fn looks_like_upgrade(request: &[u8]) -> bool {
    find_ignore_ascii_case(request, HANDSHAKE_HEADER).is_some()
}

/// Computes the reply to a handshake request.
pub trait Handshake: Send + Sync {
    /// The complete response to send, or why the attempt is refused.
    fn respond(&self, request: &[u8]) -> Result<Vec<u8>, HandshakeError>;
}

/// Lifecycle of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Callbacks into the application around a WebSocket session.
pub trait SessionHooks: Send + Sync {
    fn set_state(&self, client_id: u64, state: ConnectionState);

    /// Called once the handshake response has been sent.
    fn on_open(&self, client_id: u64);
}

/// RFC 6455 server handshake.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc6455Handshake;

impl Handshake for Rfc6455Handshake {
    fn respond(&self, request: &[u8]) -> Result<Vec<u8>, HandshakeError> {
        let head = RequestHead::parse(request).map_err(|_| HandshakeError::Incomplete)?;
        if head.method != "GET" {
            return Err(HandshakeError::BadMethod(head.method.to_string()));
        }

        let upgrade = head.header("Upgrade").unwrap_or_default();
        if !upgrade.eq_ignore_ascii_case("websocket") {
            return Err(HandshakeError::BadHeader("Upgrade"));
        }
        let connection = head.header("Connection").unwrap_or_default();
        if find_ignore_ascii_case(connection.as_bytes(), b"upgrade").is_none() {
            return Err(HandshakeError::BadHeader("Connection"));
        }
        let version = head.header("Sec-WebSocket-Version").unwrap_or_default();
        if version != "13" {
            return Err(HandshakeError::UnsupportedVersion(version.to_string()));
        }
        let key = head
            .header("Sec-WebSocket-Key")
            .filter(|key| !key.is_empty())
            .ok_or(HandshakeError::BadHeader("Sec-WebSocket-Key"))?;

        let response = format!(
            "HTTP/1.1 101 Switching Protocols\r\n\
             Upgrade: websocket\r\n\
             Connection: Upgrade\r\n\
             Sec-WebSocket-Accept: {}\r\n\r\n",
            derive_accept_key(key.as_bytes())
        );
        Ok(response.into_bytes())
    }
}

/// What to do with a freshly read request.
#[derive(Debug)]
pub enum Dispatch<'a> {
    /// Plain HTTP: send the response, then close.
    Static(Response<'a>),
    /// Handshake accepted: send `response`, then continue as a WebSocket with
    /// the bytes after `consumed`.
    Upgrade { response: Vec<u8>, consumed: usize },
    /// Upgrade attempt refused: send the 400, then close.
    Rejected(Response<'static>),
}

pub fn dispatch<'a>(
    registry: &'a AssetRegistry,
    request: &[u8],
    handshake: &dyn Handshake,
) -> Result<Dispatch<'a>, ResponseError> {
    let Some(end) = find(request, HEADER_TERMINATOR) else {
        return resolve(registry, request).map(Dispatch::Static);
    };
    if !looks_like_upgrade(request) {
        return resolve(registry, request).map(Dispatch::Static);
    }

    match handshake.respond(request) {
        Ok(response) => Ok(Dispatch::Upgrade {
            response,
            consumed: end + HEADER_TERMINATOR.len(),
        }),
        Err(err) => {
            debug!("Refusing WebSocket handshake: {}", err);
            bad_handshake().map(Dispatch::Rejected)
        }
    }
}
