//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod backend;
pub mod expenses;
pub mod features;

// Re-export all handlers for use in router
pub use backend::*;
pub use expenses::*;
pub use features::*;
