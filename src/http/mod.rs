//! HTTP protocol layer module
//!
//! Header policies, MIME detection, nonce handling and response builders,
//! kept apart from the request dispatch in `handler`.

pub mod cache;
pub mod csp;
pub mod mime;
pub mod response;
pub mod rewrite;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use response::build_asset_response;
