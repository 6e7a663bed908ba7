//! Request handler module
//!
//! HTTP host for the resolver: request validation, dispatch and mapping of
//! resolution outcomes to responses.

pub mod assets;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
