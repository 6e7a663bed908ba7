//! Asset root: the set of mounted directories requests may be served from

use super::path::NormalizedPath;
use crate::config::AssetsConfig;
use crate::error::RootError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One URL prefix bound to a canonical directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub prefix: NormalizedPath,
    pub dir: PathBuf,
}

impl Mount {
    /// Filesystem candidate for the segments below this mount's prefix
    pub fn join(&self, rest: &[String]) -> PathBuf {
        let mut path = self.dir.clone();
        path.extend(rest);
        path
    }
}

/// Immutable after construction
#[derive(Debug, Clone)]
pub struct AssetRoot {
    /// Sorted longest prefix first
    mounts: Vec<Mount>,
}

impl AssetRoot {
    /// Build mounts from configuration
    ///
    /// Mount directories are relative to `assets.root` unless absolute; a mount
    /// without `dir` serves `root/<prefix>`. With no mounts configured the
    /// whole root is served at `/`.
    pub fn from_config(config: &AssetsConfig) -> Result<Self, RootError> {
        let root = Path::new(&config.root);

        if config.mounts.is_empty() {
            return Self::new(vec![(NormalizedPath::default(), root.to_path_buf())]);
        }

        let mut pairs = Vec::with_capacity(config.mounts.len());
        for mount in &config.mounts {
            let prefix = NormalizedPath::parse(&mount.prefix)
                .map_err(|_| RootError::InvalidPrefix(mount.prefix.clone()))?;
            let dir = match &mount.dir {
                Some(dir) => root.join(dir),
                None => {
                    let mut dir = root.to_path_buf();
                    dir.extend(prefix.segments());
                    dir
                }
            };
            pairs.push((prefix, dir));
        }
        Self::new(pairs)
    }

    /// Canonicalize and validate each mount directory
    pub fn new(pairs: Vec<(NormalizedPath, PathBuf)>) -> Result<Self, RootError> {
        let mut seen = HashSet::new();
        let mut mounts = Vec::with_capacity(pairs.len());

        for (prefix, dir) in pairs {
            if !seen.insert(prefix.to_string()) {
                return Err(RootError::DuplicatePrefix(prefix.to_string()));
            }
            let canonical = dir.canonicalize().map_err(|source| RootError::Missing {
                path: dir.clone(),
                source,
            })?;
            if !canonical.is_dir() {
                return Err(RootError::NotADirectory(dir));
            }
            mounts.push(Mount {
                prefix,
                dir: canonical,
            });
        }

        mounts.sort_by(|a, b| b.prefix.segments().len().cmp(&a.prefix.segments().len()));
        Ok(Self { mounts })
    }

    /// Longest mount prefix covering `path`, with the remaining segments
    pub fn route<'a, 'p>(&'a self, path: &'p NormalizedPath) -> Option<(&'a Mount, &'p [String])> {
        self.mounts
            .iter()
            .find_map(|mount| path.strip_prefix(&mount.prefix).map(|rest| (mount, rest)))
    }

    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MountConfig;
    use std::fs;
    use tempfile::TempDir;

    fn assets(root: &Path, mounts: Vec<(&str, Option<&str>)>) -> AssetsConfig {
        AssetsConfig {
            root: root.to_string_lossy().into_owned(),
            mounts: mounts
                .into_iter()
                .map(|(prefix, dir)| MountConfig {
                    prefix: prefix.to_string(),
                    dir: dir.map(String::from),
                })
                .collect(),
            index_files: vec![],
        }
    }

    #[test]
    fn test_default_mount_serves_root() {
        let tmp = TempDir::new().unwrap();
        let root = AssetRoot::from_config(&assets(tmp.path(), vec![])).unwrap();
        assert_eq!(root.mounts().len(), 1);
        assert!(root.mounts()[0].prefix.is_root());

        let path = NormalizedPath::parse("/a/b.png").unwrap();
        let (mount, rest) = root.route(&path).unwrap();
        assert_eq!(rest, ["a", "b.png"]);
        assert_eq!(mount.join(rest), tmp.path().canonicalize().unwrap().join("a/b.png"));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("binary/subdir")).unwrap();
        fs::create_dir_all(tmp.path().join("special")).unwrap();
        let root = AssetRoot::from_config(&assets(
            tmp.path(),
            vec![("/binary", None), ("/binary/subdir", Some("special"))],
        ))
        .unwrap();

        let path = NormalizedPath::parse("/binary/subdir/png.png").unwrap();
        let (mount, rest) = root.route(&path).unwrap();
        assert!(mount.dir.ends_with("special"));
        assert_eq!(rest, ["png.png"]);

        let path = NormalizedPath::parse("/binary/png.png").unwrap();
        let (mount, _) = root.route(&path).unwrap();
        assert!(mount.dir.ends_with("binary"));
    }

    #[test]
    fn test_unrouted_path() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("binary")).unwrap();
        let root = AssetRoot::from_config(&assets(tmp.path(), vec![("/binary", None)])).unwrap();
        assert!(root.route(&NormalizedPath::parse("/ff404.png").unwrap()).is_none());
        assert!(root.route(&NormalizedPath::parse("/binaryx/a").unwrap()).is_none());
    }

    #[test]
    fn test_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let err = AssetRoot::from_config(&assets(tmp.path(), vec![("/nope", None)]));
        assert!(matches!(err, Err(RootError::Missing { .. })));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file.txt"), "x").unwrap();
        let err = AssetRoot::from_config(&assets(tmp.path(), vec![("/f", Some("file.txt"))]));
        assert!(matches!(err, Err(RootError::NotADirectory(_))));
    }

    #[test]
    fn test_duplicate_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        let err = AssetRoot::from_config(&assets(
            tmp.path(),
            vec![("/a", None), ("/a/", Some("a"))],
        ));
        assert!(matches!(err, Err(RootError::DuplicatePrefix(_))));
    }

    #[test]
    fn test_invalid_prefix() {
        let tmp = TempDir::new().unwrap();
        let err = AssetRoot::from_config(&assets(tmp.path(), vec![("/../x", None)]));
        assert!(matches!(err, Err(RootError::InvalidPrefix(_))));
    }
}
