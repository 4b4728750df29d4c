//! Turns one raw HTTP request into exactly one response.

use tracing::debug;

use crate::error::ResponseError;
use crate::header::etag_token;
use crate::registry::AssetRegistry;
use crate::request::{RequestHead, MAX_PATH_LEN};
use crate::response::{Response, Status};

pub const BAD_REQUEST: &[u8] = b"Bad Request\n";
pub const METHOD_NOT_ALLOWED: &[u8] = b"Method Not Allowed\n";
pub const NOT_FOUND: &[u8] = b"Not Found\n";
pub const BAD_HANDSHAKE: &[u8] = b"Bad WebSocket handshake\n";

/// Resolve `request` against the registry.
///
/// The caller sends the response and closes the connection. An `Err` means
/// the response could not be assembled; nothing should be sent.
pub fn resolve<'a>(registry: &'a AssetRegistry, request: &[u8]) -> Result<Response<'a>, ResponseError> {
    let head = match RequestHead::parse(request) {
        Ok(head) => head,
        Err(err) => {
            debug!("Rejecting request: {:?}", err);
            return Response::text(Status::BadRequest, BAD_REQUEST);
        }
    };

    if head.method != "GET" && head.method != "HEAD" {
        debug!("{} {} -> 405", head.method, head.target);
        return Response::text(Status::MethodNotAllowed, METHOD_NOT_ALLOWED);
    }

    let mut path = head.path();
    if path.len() > MAX_PATH_LEN {
        debug!("{} path of {} bytes -> 400", head.method, path.len());
        return Response::text(Status::BadRequest, BAD_REQUEST);
    }
    if path == "/" {
        match registry.resolve_root_if_needed() {
            Some(alias) => path = alias,
            None => {
                debug!("{} / -> 404 (no root alias)", head.method);
                return Response::text(Status::NotFound, NOT_FOUND);
            }
        }
    }

    let Some(asset) = registry.active_table().get(path) else {
        debug!("{} {} -> 404", head.method, path);
        return Response::text(Status::NotFound, NOT_FOUND);
    };

    if let Some(etag) = etag_token(asset.header_block()) {
        if head.if_none_match(etag) {
            debug!("{} {} -> 304", head.method, path);
            return Response::build(Status::NotModified, Some(asset.header_block()), &[], asset.size());
        }
    }

    let body = if head.is_head() { &[][..] } else { asset.content() };
    debug!("{} {} -> 200 ({} bytes)", head.method, path, asset.size());
    Response::build(Status::Ok, Some(asset.header_block()), body, asset.size())
}

/// Response for a request that tried to upgrade but failed the handshake.
pub fn bad_handshake() -> Result<Response<'static>, ResponseError> {
    Response::text(Status::BadRequest, BAD_HANDSHAKE)
}

