use std::fmt::Write as _;

use crate::error::ResponseError;
use crate::header::response_headers;

/// Largest response head that will be sent. Anything bigger is dropped.
pub const MAX_HEAD_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotModified,
    BadRequest,
    NotFound,
    MethodNotAllowed,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NotModified => 304,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
        }
    }

    pub fn reason(self) -> &'static str {
        reason_phrase(self.code())
    }
}

/// Reason phrase for a status code. Codes without an entry get "OK".
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        304 => "Not Modified",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "OK",
    }
}

/// A complete `Connection: close` response. The body borrows from the asset
/// table or from a static message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<'a> {
    status: Status,
    head: Vec<u8>,
    body: &'a [u8],
}

impl<'a> Response<'a> {
    /// Assemble a response.
    ///
    /// `content_type` is either a bare MIME type or full header lines (see
    /// [`response_headers`]). `content_length` is declared as is, so HEAD and
    /// 304 responses can announce a length while sending no body.
    pub fn build(
        status: Status,
        content_type: Option<&str>,
        body: &'a [u8],
        content_length: u32,
    ) -> Result<Self, ResponseError> {
        let headers = response_headers(content_type);
        let mut head = String::with_capacity(MAX_HEAD_LEN);
        let _ = write!(
            head,
            "HTTP/1.1 {} {}\r\nConnection: close\r\n{}Content-Length: {}\r\n\r\n",
            status.code(),
            status.reason(),
            headers,
            content_length
        );
        if head.len() >= MAX_HEAD_LEN {
            return Err(ResponseError::HeaderOverflow {
                needed: head.len(),
                limit: MAX_HEAD_LEN,
            });
        }
        Ok(Self {
            status,
            head: head.into_bytes(),
            body,
        })
    }

    /// A plain-text error or notice whose body is `message`.
    pub fn text(status: Status, message: &'static [u8]) -> Result<Self, ResponseError> {
        Self::build(status, None, message, message.len() as u32)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn head(&self) -> &[u8] {
        &self.head
    }

    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// Head and body in one buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.head.len() + self.body.len());
        bytes.extend_from_slice(&self.head);
        bytes.extend_from_slice(self.body);
        bytes
    }
}
