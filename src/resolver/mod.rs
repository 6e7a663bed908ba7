//! Static asset resolution
//!
//! `StaticAssetResolver::resolve` runs, in order: path normalization, policy
//! check, mount routing, existence check, containment check, content-type
//! inference and the read. Everything up to routing is pure, so a refusal
//! never reveals whether a file exists.

mod outcome;
mod path;
mod policy;
mod root;

pub use outcome::{Asset, ForbiddenReason, NotFoundReason, ResolutionOutcome};
pub use path::{NormalizedPath, RouteRequest};
pub use policy::{AccessPolicy, PolicyVerdict};
pub use root::{AssetRoot, Mount};

use crate::error::ResolveError;
use crate::http::mime;
use crate::logger;
use hyper::body::Bytes;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Stateless resolver over an immutable asset root and policy
///
/// Safe to share behind `Arc` across any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct StaticAssetResolver {
    root: AssetRoot,
    policy: AccessPolicy,
    index_files: Vec<String>,
}

impl StaticAssetResolver {
    pub const fn new(root: AssetRoot, policy: AccessPolicy, index_files: Vec<String>) -> Self {
        Self {
            root,
            policy,
            index_files,
        }
    }

    pub const fn root(&self) -> &AssetRoot {
        &self.root
    }

    /// Resolve a path with no base path
    pub async fn resolve_path(&self, path: &str) -> Result<ResolutionOutcome, ResolveError> {
        self.resolve(&RouteRequest::new(path)).await
    }

    /// Resolve one request
    pub async fn resolve(&self, request: &RouteRequest) -> Result<ResolutionOutcome, ResolveError> {
        let path = match request.normalized() {
            Ok(p) => p,
            Err(reason) => return Ok(forbidden(&request.path, reason)),
        };

        if let PolicyVerdict::Deny(reason) = self.policy.evaluate(&path) {
            return Ok(forbidden(&request.path, reason));
        }

        let Some((mount, rest)) = self.root.route(&path) else {
            return Ok(forbidden(&request.path, ForbiddenReason::Unrouted));
        };

        let file_path = match self.locate(mount.join(rest)).await? {
            Located::File(p) => p,
            Located::Absent(reason) => return Ok(ResolutionOutcome::NotFound(reason)),
        };

        let canonical = fs::canonicalize(&file_path)
            .await
            .map_err(|source| ResolveError::Canonicalize {
                path: file_path.clone(),
                source,
            })?;
        let Some(served) = served_path(mount, &canonical) else {
            logger::log_warning(&format!(
                "Path escapes mount directory: {} -> {}",
                request.path,
                canonical.display()
            ));
            return Ok(ResolutionOutcome::Forbidden(ForbiddenReason::OutsideRoot));
        };

        // Index files and in-mount symlinks land on a different path than the
        // one requested; the file actually read must pass the policy too
        if served != path {
            if let PolicyVerdict::Deny(reason) = self.policy.evaluate(&served) {
                return Ok(forbidden(&request.path, reason));
            }
        }

        let body = fs::read(&canonical)
            .await
            .map_err(|source| ResolveError::Read {
                path: canonical.clone(),
                source,
            })?;

        Ok(ResolutionOutcome::Found(Asset {
            size: body.len(),
            body: Bytes::from(body),
            content_type: mime::get_content_type(served.extension().as_deref()),
            relative_path: served.to_string(),
        }))
    }

    /// Existing regular file for `candidate`, trying index files for directories
    async fn locate(&self, candidate: PathBuf) -> Result<Located, ResolveError> {
        let Some(meta) = metadata(&candidate).await? else {
            return Ok(Located::Absent(NotFoundReason::Missing));
        };

        if meta.is_file() {
            return Ok(Located::File(candidate));
        }
        if !meta.is_dir() {
            return Ok(Located::Absent(NotFoundReason::Missing));
        }

        for index in &self.index_files {
            let index_path = candidate.join(index);
            if let Some(m) = metadata(&index_path).await? {
                if m.is_file() {
                    return Ok(Located::File(index_path));
                }
            }
        }
        Ok(Located::Absent(NotFoundReason::DirectoryWithoutIndex))
    }
}

enum Located {
    File(PathBuf),
    Absent(NotFoundReason),
}

/// File metadata, with absence reported as `None` rather than an error
async fn metadata(path: &Path) -> Result<Option<std::fs::Metadata>, ResolveError> {
    match fs::metadata(path).await {
        Ok(m) => Ok(Some(m)),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(None),
        Err(source) => Err(ResolveError::Metadata {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// URL path of a canonical file under `mount`, or `None` when it lies outside
fn served_path(mount: &Mount, canonical: &Path) -> Option<NormalizedPath> {
    let rel = canonical.strip_prefix(&mount.dir).ok()?;
    let mut segments = mount.prefix.segments().to_vec();
    for component in rel.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_str()?.to_string()),
            _ => return None,
        }
    }
    Some(NormalizedPath::from_segments(segments))
}

fn forbidden(raw: &str, reason: ForbiddenReason) -> ResolutionOutcome {
    logger::log_debug(&format!("Forbidden {raw}: {reason}"));
    ResolutionOutcome::Forbidden(reason)
}
