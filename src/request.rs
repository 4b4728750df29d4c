//! Request heads as borrowed views over the bytes read from the socket.
//!
//! Nothing here copies or rewrites the input, so later stages (the upgrade
//! hand-off, conditional checks) still see the original request.

/// Blank line closing an HTTP request head.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Longest request path (query excluded) accepted for lookup. Longer paths
/// are rejected once the method has been checked.
pub const MAX_PATH_LEN: usize = 511;

/// Most filler bytes (`"`, whitespace) tolerated between `If-None-Match:`
/// and the ETag token.
const MAX_ETAG_GAP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// No blank line terminating the head.
    Incomplete,
    /// Request line without method and path.
    MalformedLine,
}

/// Method, target and header lines of one request.
#[derive(Debug, Clone, Copy)]
pub struct RequestHead<'a> {
    pub method: &'a str,
    pub target: &'a str,
    /// Header lines after the request line, each ending in CRLF.
    pub headers: &'a [u8],
}

impl<'a> RequestHead<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<Self, ParseError> {
        let end = find(buf, HEADER_TERMINATOR).ok_or(ParseError::Incomplete)?;
        // Keep the CRLF of the last header line.
        let head = &buf[..end + 2];

        let line_end = head
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(head.len());
        let line = &head[..line_end];
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let headers = head.get(line_end + 1..).unwrap_or_default();

        let (method, target) = parse_request_line(line).ok_or(ParseError::MalformedLine)?;

        Ok(Self {
            method,
            target,
            headers,
        })
    }

    /// Target with the query string removed.
    pub fn path(&self) -> &'a str {
        strip_query(self.target)
    }

    pub fn is_head(&self) -> bool {
        self.method == "HEAD"
    }

    /// Value of the first header named `name` (case-insensitive), trimmed.
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers
            .split(|&b| b == b'\n')
            .filter_map(|line| {
                let colon = line.iter().position(|&b| b == b':')?;
                line[..colon]
                    .eq_ignore_ascii_case(name.as_bytes())
                    .then(|| &line[colon + 1..])
            })
            .next()
            .and_then(|value| std::str::from_utf8(value).ok())
            .map(str::trim)
    }

    /// Whether the client already holds `etag`, judged from `If-None-Match`.
    pub fn if_none_match(&self, etag: &str) -> bool {
        if_none_match(self.headers, etag)
    }
}

/// Split `METHOD SP TARGET SP ...` on its first two spaces.
fn parse_request_line(line: &[u8]) -> Option<(&str, &str)> {
    let sp1 = line.iter().position(|&b| b == b' ')?;
    let rest = &line[sp1 + 1..];
    let sp2 = rest.iter().position(|&b| b == b' ')?;

    let method = std::str::from_utf8(&line[..sp1]).ok()?;
    let target = std::str::from_utf8(&rest[..sp2]).ok()?;
    Some((method, target))
}

pub fn strip_query(target: &str) -> &str {
    target.split('?').next().unwrap_or(target)
}

/// Whether `headers` carries `If-None-Match` followed closely by `etag`.
pub fn if_none_match(headers: &[u8], etag: &str) -> bool {
    const NAME: &[u8] = b"if-none-match:";
    let Some(start) = find_ignore_ascii_case(headers, NAME) else {
        return false;
    };
    let after = &headers[start + NAME.len()..];
    matches!(find_ignore_ascii_case(after, etag.as_bytes()), Some(gap) if gap <= MAX_ETAG_GAP)
}

pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

// Case-insensitive ASCII search without allocation
pub fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

/// Bytes between the first `start` and the next `end` after it, both
/// matched case-insensitively.
pub fn slice_between_ignore_ascii_case<'a>(
    haystack: &'a [u8],
    start: &[u8],
    end: &[u8],
) -> Option<&'a [u8]> {
    let from = find_ignore_ascii_case(haystack, start)? + start.len();
    let rest = &haystack[from..];
    let len = find_ignore_ascii_case(rest, end)?;
    Some(&rest[..len])
}
