//! Request handler module
//!
//! Responsible for resolving request paths against the asset table.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
