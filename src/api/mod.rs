//! Admin REST API access: the authenticated request wrapper and the per
//! resource endpoint helpers built on it.

pub mod client;
pub mod error;
pub mod resources;

pub use client::{ApiClient, ADMIN_PREFIX};
pub use error::ApiError;
pub use resources::{with_query, Filters};
