//! The slice of HTTP/1.1 the device speaks.
//!
//! Requests are always `GET` with `Connection: close`, so the body runs
//! until the server closes the socket. Only the status code and the
//! `Content-Length` header are interpreted.

/// Success
pub const STATUS_OK: u16 = 200;

/// Conditional request hit: the resource did not change
pub const STATUS_NOT_MODIFIED: u16 = 304;

/// Parse a status line such as `HTTP/1.1 200 OK`
///
/// Returns `None` if the line is not an HTTP/1.x status line.
pub fn parse_status_line(line: &[u8]) -> Option<u16> {
    let line = core::str::from_utf8(line).ok()?;
    let mut parts = line.split_ascii_whitespace();

    let version = parts.next()?;
    if !version.starts_with("HTTP/1.") {
        return None;
    }

    let code = parts.next()?;
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    code.parse().ok()
}

/// Parse a `Content-Length` header line
///
/// Header names are case-insensitive. Returns `None` for any other header
/// or for a value that is not a decimal integer.
pub fn parse_content_length(line: &[u8]) -> Option<usize> {
    const NAME: &[u8] = b"content-length";

    let colon = line.iter().position(|&b| b == b':')?;
    let (name, value) = line.split_at(colon);
    if !name.trim_ascii().eq_ignore_ascii_case(NAME) {
        return None;
    }

    let value = core::str::from_utf8(&value[1..]).ok()?.trim();
    value.parse().ok()
}

/// Human readable text for a status code
pub const fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        304 => "Not Modified",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Code",
    }
}
