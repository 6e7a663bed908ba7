//! HTTP protocol layer module
//!
//! Protocol helpers shared by the HTTP host and the gateway adapter, decoupled
//! from asset resolution.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_304_response, build_403_response, build_404_response, build_405_response,
    build_413_response, build_416_response, build_500_response, build_asset_response,
    build_health_response, build_options_response, build_partial_response, AssetHeaders,
};
