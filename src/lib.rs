//! asset-gate: static asset gateway
//!
//! The core is [`resolver::StaticAssetResolver`], which classifies a request
//! path as found, forbidden or not found against an immutable asset root and
//! access policy. Two hosts sit on top of it: an HTTP server (`handler`,
//! `server`) and a gateway proxy adapter (`gateway`).

pub mod config;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod http;
pub mod logger;
pub mod resolver;
pub mod server;
