//! HTTP Range request parsing module
//!
//! Single byte-range support (RFC 7233) for served assets.

use hyper::body::Bytes;

/// Inclusive byte range already clamped to the asset size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn len(self) -> usize {
        self.end - self.start + 1
    }

    /// Zero-copy view of the range within `data`
    pub fn slice(self, data: &Bytes) -> Bytes {
        data.slice(self.start..=self.end)
    }

    /// `Content-Range` header value
    pub fn content_range(self, total: usize) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    Valid(ByteRange),
    /// Should be answered with 416
    NotSatisfiable,
    /// No Range header or one we ignore (full content is served)
    None,
}

/// Parse a `Range` header (bytes unit, single range)
///
/// Supports `bytes=start-end`, `bytes=start-` and `bytes=-suffix`.
///
/// # Examples
/// ```
/// use asset_gate::http::range::{parse_range_header, RangeParseResult};
///
/// assert!(matches!(parse_range_header(Some("bytes=0-99"), 1000), RangeParseResult::Valid(_)));
/// assert!(matches!(parse_range_header(None, 1000), RangeParseResult::None));
/// ```
pub fn parse_range_header(range_header: Option<&str>, size: usize) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };

    // Multi-range is not supported; serve the whole body instead
    if spec.contains(',') {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if size == 0 {
        return RangeParseResult::NotSatisfiable;
    }
    let last = size - 1;

    if start_str.is_empty() {
        return match end_str.parse::<usize>() {
            Ok(0) => RangeParseResult::NotSatisfiable,
            Ok(suffix) => RangeParseResult::Valid(ByteRange {
                start: size.saturating_sub(suffix),
                end: last,
            }),
            Err(_) => RangeParseResult::None,
        };
    }

    let Ok(start) = start_str.parse::<usize>() else {
        return RangeParseResult::None;
    };
    if start > last {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if end_str.is_empty() {
        last
    } else {
        match end_str.parse::<usize>() {
            Ok(e) if e < start => return RangeParseResult::NotSatisfiable,
            Ok(e) => e.min(last),
            Err(_) => return RangeParseResult::None,
        }
    };

    RangeParseResult::Valid(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(header: &str, size: usize) -> ByteRange {
        match parse_range_header(Some(header), size) {
            RangeParseResult::Valid(r) => r,
            other => panic!("expected Valid for {header}, got {other:?}"),
        }
    }

    #[test]
    fn test_standard_range() {
        let r = valid("bytes=0-9", 100);
        assert_eq!((r.start, r.end, r.len()), (0, 9, 10));
        assert_eq!(r.content_range(100), "bytes 0-9/100");
    }

    #[test]
    fn test_open_and_clamped_range() {
        assert_eq!(valid("bytes=50-", 100), ByteRange { start: 50, end: 99 });
        assert_eq!(valid("bytes=90-500", 100), ByteRange { start: 90, end: 99 });
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(valid("bytes=-20", 100), ByteRange { start: 80, end: 99 });
        assert_eq!(valid("bytes=-500", 100), ByteRange { start: 0, end: 99 });
    }

    #[test]
    fn test_not_satisfiable() {
        for h in ["bytes=200-", "bytes=-0", "bytes=9-3"] {
            assert_eq!(
                parse_range_header(Some(h), 100),
                RangeParseResult::NotSatisfiable,
                "{h}"
            );
        }
        assert_eq!(
            parse_range_header(Some("bytes=0-"), 0),
            RangeParseResult::NotSatisfiable
        );
    }

    #[test]
    fn test_ignored() {
        for h in ["bytes=a-b", "bytes=0-9,20-29", "items=0-9", "bytes=5"] {
            assert_eq!(parse_range_header(Some(h), 100), RangeParseResult::None, "{h}");
        }
        assert_eq!(parse_range_header(None, 100), RangeParseResult::None);
    }

    #[test]
    fn test_slice() {
        let data = Bytes::from_static(b"0123456789");
        let r = valid("bytes=2-4", data.len());
        assert_eq!(r.slice(&data).as_ref(), b"234");
    }
}
