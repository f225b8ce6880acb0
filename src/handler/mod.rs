//! Request handler module
//!
//! Path routing plus the shared operation executor.

pub mod executor;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
