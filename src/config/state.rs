// Application state module
// Immutable configuration and resolver shared by every connection

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::error::RootError;
use crate::resolver::StaticAssetResolver;

/// Application state
pub struct AppState {
    pub config: Config,
    pub resolver: StaticAssetResolver,
    /// Open connections on the main listener
    pub active_connections: AtomicUsize,
}

impl AppState {
    /// Build state, validating the asset root and policy
    pub fn new(config: Config) -> Result<Self, RootError> {
        let resolver = config.build_resolver()?;
        Ok(Self::with_resolver(config, resolver))
    }

    pub const fn with_resolver(config: Config, resolver: StaticAssetResolver) -> Self {
        Self {
            config,
            resolver,
            active_connections: AtomicUsize::new(0),
        }
    }
}
