//! SeaORM persistence layer for Keystone
//!
//! Every business table is keyed by the composite `(account_id, company_id,
//! id)` primary key, where `id` is tenant-local and assigned by the
//! allocator at insert time. This crate makes the tenant-isolation rule
//! structural: scoped queries can only be built through [`scoped::select`],
//! which requires the tenant pair up front, and ad hoc statements go through
//! the [`guard::TenantGuard`] which appends the tenant predicate for every
//! scoped table the statement touches.

pub mod allocator;
pub mod config;
pub mod connection;
pub mod entities;
pub mod guard;
pub mod migrations;
pub mod repositories;
pub mod scoped;
pub mod testing;

pub use config::DatabaseConfig;
pub use connection::{DatabaseConnection, DatabaseError};
pub use guard::TenantGuard;
pub use repositories::{Repository, RepositoryFactory};
pub use scoped::{ListParams, TenantScopedEntity};

// Re-export common SeaORM types for convenience
pub use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
