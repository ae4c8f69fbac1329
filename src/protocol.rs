//! Line protocol parser and response generator.
//!
//! ```text
//! Request:  <decimal integer>\n
//! Response: <decimal integer>\n
//! ```
//!
//! There is no framing beyond the terminator: whatever one read returned is
//! treated as one request. A line split across reads, or two lines arriving
//! in the same read, fails to parse and is dropped.

use crate::error::RequestError;
use bytes::{BufMut, Bytes, BytesMut};
use std::str;

/// A parsed request: the Fibonacci index to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub n: i64,
}

impl Request {
    /// Parse one chunk read from the connection.
    ///
    /// A single trailing `\n` (or `\r\n`) is removed and the rest must be a
    /// base-10 `i64`. When `max_index` is set, larger indices are rejected.
    pub fn parse(chunk: &[u8], max_index: Option<i64>) -> Result<Self, RequestError> {
        let line = str::from_utf8(strip_terminator(chunk))?;
        let n: i64 = line.parse()?;

        if let Some(max) = max_index {
            if n > max {
                return Err(RequestError::OutOfRange { n, max });
            }
        }

        Ok(Request { n })
    }
}

/// Remove exactly one trailing line terminator, if present.
pub fn strip_terminator(chunk: &[u8]) -> &[u8] {
    match chunk {
        [rest @ .., b'\r', b'\n'] => rest,
        [rest @ .., b'\n'] => rest,
        _ => chunk,
    }
}

/// Response encoding.
pub struct Response;

impl Response {
    /// Encode a computed value as `<value>\n`.
    pub fn value(value: i64) -> Bytes {
        let digits = value.to_string();
        let mut response = BytesMut::with_capacity(digits.len() + 1);
        response.extend_from_slice(digits.as_bytes());
        response.put_u8(b'\n');
        response.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        assert_eq!(Request::parse(b"10\n", None), Ok(Request { n: 10 }));
        assert_eq!(Request::parse(b"10\r\n", None), Ok(Request { n: 10 }));
        assert_eq!(Request::parse(b"7", None), Ok(Request { n: 7 }));
        assert_eq!(Request::parse(b"-3\n", None), Ok(Request { n: -3 }));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            Request::parse(b"abc\n", None),
            Err(RequestError::InvalidNumber(_))
        ));
        assert!(matches!(
            Request::parse(b"\n", None),
            Err(RequestError::InvalidNumber(_))
        ));
        assert!(matches!(
            Request::parse(b" 5\n", None),
            Err(RequestError::InvalidNumber(_))
        ));
        assert!(matches!(
            Request::parse(&[0xff, 0xfe, b'\n'], None),
            Err(RequestError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_only_one_terminator_stripped() {
        // Two requests landing in the same read are not split apart.
        assert!(Request::parse(b"1\n2\n", None).is_err());
        assert!(Request::parse(b"5\n\n", None).is_err());
    }

    #[test]
    fn test_max_index() {
        assert_eq!(Request::parse(b"30\n", Some(30)), Ok(Request { n: 30 }));
        assert_eq!(
            Request::parse(b"31\n", Some(30)),
            Err(RequestError::OutOfRange { n: 31, max: 30 })
        );
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator(b"12\n"), b"12");
        assert_eq!(strip_terminator(b"12\r\n"), b"12");
        assert_eq!(strip_terminator(b"12"), b"12");
        assert_eq!(strip_terminator(b""), b"");
    }

    #[test]
    fn test_response_value() {
        assert_eq!(&Response::value(55)[..], b"55\n");
        assert_eq!(&Response::value(1)[..], b"1\n");
    }
}
