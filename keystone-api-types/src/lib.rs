//! Shared types for the Keystone property back office
//!
//! This crate provides the value types every Keystone layer agrees on: the
//! two-level tenant scope and composite entity keys, the user-facing error
//! taxonomy with HTTP status mapping, and pagination envelopes.

pub mod errors;
pub mod pagination;
pub mod scope;

// Re-export main types for convenience
pub use errors::{ApiError, ApiResult};
pub use pagination::{ListResponse, PaginationInput};
pub use scope::{AuthContext, ScopedKey, TenantScope};
