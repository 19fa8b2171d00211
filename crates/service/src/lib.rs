//! Client side of the card portal.
//! - `api`: typed calls to the account backend, plus a scripted mock.
//! - `cache`: per-session query cache with request deduplication.
//! - `session`: login, logout and password change on top of the cache.
//! - `views`: page models built from cache snapshots.

pub mod errors;
pub mod observability;
pub mod api;
pub mod cache;
pub mod session;
pub mod views;
#[cfg(test)]
pub mod test_support;

pub use api::{HttpPortalApi, MockPortalApi, PortalApi};
pub use cache::{QueryCache, QueryData, QueryKey, QuerySnapshot, QueryStatus};
pub use errors::ApiError;
pub use session::{MutationKind, MutationState, Navigation, PortalSession};
