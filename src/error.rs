//! Error types
//!
//! Classification outcomes (forbidden / not found) are not errors; they live in
//! `resolver::outcome`. The types here cover faults only.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Internal fault raised while resolving an asset that passed the policy check
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to stat `{}`", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to canonicalize `{}`", path.display())]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors building the asset root or access policy at startup
#[derive(Debug, Error)]
pub enum RootError {
    #[error("asset directory `{}` is not accessible", path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("asset path `{}` is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid mount prefix `{0}`")]
    InvalidPrefix(String),

    #[error("mount prefix `{0}` is configured more than once")]
    DuplicatePrefix(String),

    #[error("invalid policy pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
