//! Shared plumbing for the portal crates: logging setup, the admin listener
//! and the small response types every HTTP surface reuses.

pub mod types;
pub mod utils;
pub mod admin_http;
