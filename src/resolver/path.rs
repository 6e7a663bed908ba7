//! Request path normalization
//!
//! Turns a decoded request path into a list of clean segments. No filesystem
//! access happens here.

use super::outcome::ForbiddenReason;
use std::fmt;

/// One inbound lookup: a decoded path plus an optional base path (for example
/// a deployment stage such as `/dev`) that is stripped before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub path: String,
    pub base_path: Option<String>,
}

impl RouteRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            base_path: None,
        }
    }

    #[must_use]
    pub fn with_base_path(mut self, base_path: Option<impl Into<String>>) -> Self {
        self.base_path = base_path.map(Into::into);
        self
    }

    /// Normalize the path and strip the base path
    ///
    /// A path that does not live under the base path is `Unrouted`.
    pub fn normalized(&self) -> Result<NormalizedPath, ForbiddenReason> {
        let path = NormalizedPath::parse(&self.path)?;
        let Some(base) = self.base_path.as_deref() else {
            return Ok(path);
        };
        let base = NormalizedPath::parse(base).map_err(|_| ForbiddenReason::Unrouted)?;
        path.strip_prefix(&base)
            .map(|rest| NormalizedPath {
                segments: rest.to_vec(),
            })
            .ok_or(ForbiddenReason::Unrouted)
    }
}

/// A request path reduced to plain segments: no empty, `.` or `..` segments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedPath {
    segments: Vec<String>,
}

impl NormalizedPath {
    /// Normalize a decoded path
    ///
    /// `..` pops the previous segment; popping past the root is `Traversal`.
    /// NUL bytes and backslashes are `MalformedPath`.
    ///
    /// # Examples
    /// ```
    /// use asset_gate::resolver::NormalizedPath;
    /// let p = NormalizedPath::parse("/binary/./subdir//png.png").unwrap();
    /// assert_eq!(p.to_string(), "/binary/subdir/png.png");
    /// assert!(NormalizedPath::parse("/../etc/passwd").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ForbiddenReason> {
        if raw.contains('\0') || raw.contains('\\') {
            return Err(ForbiddenReason::MalformedPath);
        }

        let mut segments: Vec<String> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(ForbiddenReason::Traversal);
                    }
                }
                s => segments.push(s.to_string()),
            }
        }

        Ok(Self { segments })
    }

    /// Build from segments that are already clean
    pub(crate) const fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment-aware prefix check: `/binary` covers `/binary/x` but not `/binaryx`
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Remaining segments after `prefix`, if `prefix` covers this path
    pub fn strip_prefix(&self, prefix: &Self) -> Option<&[String]> {
        if self.starts_with(prefix) {
            Some(&self.segments[prefix.segments.len()..])
        } else {
            None
        }
    }

    /// Extension of the final segment, lower-cased
    pub fn extension(&self) -> Option<String> {
        let last = self.segments.last()?;
        let (stem, ext) = last.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collapses_separators_and_dots() {
        let p = NormalizedPath::parse("//binary/./subdir///png.png").unwrap();
        assert_eq!(p.segments(), ["binary", "subdir", "png.png"]);
        assert_eq!(p.to_string(), "/binary/subdir/png.png");
    }

    #[test]
    fn test_parse_root() {
        let p = NormalizedPath::parse("/").unwrap();
        assert!(p.is_root());
        assert_eq!(p.to_string(), "/");
    }

    #[test]
    fn test_parent_within_root() {
        let p = NormalizedPath::parse("/binary/subdir/../png.png").unwrap();
        assert_eq!(p.to_string(), "/binary/png.png");
    }

    #[test]
    fn test_parent_escape() {
        assert_eq!(
            NormalizedPath::parse("/binary/../../secret"),
            Err(ForbiddenReason::Traversal)
        );
        assert_eq!(
            NormalizedPath::parse(".."),
            Err(ForbiddenReason::Traversal)
        );
    }

    #[test]
    fn test_malformed() {
        assert_eq!(
            NormalizedPath::parse("/binary/a\0b"),
            Err(ForbiddenReason::MalformedPath)
        );
        assert_eq!(
            NormalizedPath::parse("/binary\\..\\x"),
            Err(ForbiddenReason::MalformedPath)
        );
    }

    #[test]
    fn test_prefix_is_segment_aware() {
        let prefix = NormalizedPath::parse("/binary").unwrap();
        assert!(NormalizedPath::parse("/binary/png.png")
            .unwrap()
            .starts_with(&prefix));
        assert!(NormalizedPath::parse("/binary").unwrap().starts_with(&prefix));
        assert!(!NormalizedPath::parse("/binaryx/png.png")
            .unwrap()
            .starts_with(&prefix));
    }

    #[test]
    fn test_extension() {
        let ext = |s: &str| NormalizedPath::parse(s).unwrap().extension();
        assert_eq!(ext("/a/B.PNG"), Some("png".to_string()));
        assert_eq!(ext("/a/archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(ext("/a/README"), None);
        assert_eq!(ext("/"), None);
    }

    #[test]
    fn test_base_path_stripping() {
        let req = RouteRequest::new("/dev/binary/png.png").with_base_path(Some("/dev"));
        assert_eq!(req.normalized().unwrap().to_string(), "/binary/png.png");

        let req = RouteRequest::new("/prod/binary/png.png").with_base_path(Some("/dev"));
        assert_eq!(req.normalized(), Err(ForbiddenReason::Unrouted));

        let req = RouteRequest::new("/binary/png.png").with_base_path(None::<String>);
        assert_eq!(req.normalized().unwrap().to_string(), "/binary/png.png");
    }
}
