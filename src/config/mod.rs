// Configuration module entry point
// Loads layered configuration and builds the asset resolver from it

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::RootError;
use crate::resolver::{AccessPolicy, AssetRoot, StaticAssetResolver};

// Re-export public types
pub use state::AppState;
pub use types::{
    AssetsConfig, Config, HealthConfig, HttpConfig, LoggingConfig, MountConfig,
    PerformanceConfig, PolicyConfig, PolicyRule, RuleAction, ServerConfig,
};

/// Default config file (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `ASSET_GATE_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "ASSET_GATE";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "asset-gate")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("http.cache_max_age", 3600)?
            .set_default("assets.root", "public")?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the runtime cannot start with
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.workers == Some(0) {
            return Err(config::ConfigError::Message(
                "server.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Validate mounts and rules and build the immutable resolver
    pub fn build_resolver(&self) -> Result<StaticAssetResolver, RootError> {
        let root = AssetRoot::from_config(&self.assets)?;
        let policy = AccessPolicy::from_config(&self.policy)?;
        Ok(StaticAssetResolver::new(
            root,
            policy,
            self.assets.index_files.clone(),
        ))
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
