//! Resolution outcome types

use hyper::body::Bytes;
use std::fmt;

/// A servable asset loaded from under the asset root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Full file content
    pub body: Bytes,
    /// MIME type inferred from the file extension
    pub content_type: &'static str,
    /// Byte length of `body`
    pub size: usize,
    /// Normalized request path the asset was served for, e.g. `/binary/png.png`
    pub relative_path: String,
}

/// Why a request was refused before (or instead of) serving it
///
/// Reasons are for server-side logging only. Clients always get the same
/// 403 body whatever the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// Path contains NUL bytes, backslashes or undecodable bytes
    MalformedPath,
    /// `..` segments climb above the root
    Traversal,
    /// A segment starts with `.`
    HiddenSegment,
    /// Matched a deny rule (carries the rule's pattern)
    DeniedByRule(String),
    /// No mount (or base path) covers the path
    Unrouted,
    /// The file exists but resolves outside its mount, e.g. via symlink
    OutsideRoot,
}

/// Why a permitted path did not produce an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    Missing,
    DirectoryWithoutIndex,
}

/// Tagged result of one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Found(Asset),
    Forbidden(ForbiddenReason),
    NotFound(NotFoundReason),
}

impl ResolutionOutcome {
    /// HTTP status code the host should answer with
    pub const fn status(&self) -> u16 {
        match self {
            Self::Found(_) => 200,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
        }
    }

    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Short label used in logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPath => f.write_str("malformed path"),
            Self::Traversal => f.write_str("parent traversal above root"),
            Self::HiddenSegment => f.write_str("hidden path segment"),
            Self::DeniedByRule(pattern) => write!(f, "denied by rule `{pattern}`"),
            Self::Unrouted => f.write_str("no mount covers path"),
            Self::OutsideRoot => f.write_str("resolved outside mount directory"),
        }
    }
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("no such file"),
            Self::DirectoryWithoutIndex => f.write_str("directory without index file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let asset = Asset {
            body: Bytes::from_static(b"x"),
            content_type: "image/png",
            size: 1,
            relative_path: "/binary/png.png".to_string(),
        };
        assert_eq!(ResolutionOutcome::Found(asset).status(), 200);
        assert_eq!(
            ResolutionOutcome::Forbidden(ForbiddenReason::Unrouted).status(),
            403
        );
        assert_eq!(
            ResolutionOutcome::NotFound(NotFoundReason::Missing).status(),
            404
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            ForbiddenReason::DeniedByRule("/private".to_string()).to_string(),
            "denied by rule `/private`"
        );
        assert_eq!(NotFoundReason::Missing.to_string(), "no such file");
    }
}
