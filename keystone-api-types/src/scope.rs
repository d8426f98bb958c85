//! Two-level tenant scope and composite entity keys
//!
//! Every business table in Keystone is partitioned by an `(account_id,
//! company_id)` pair, and row ids are only unique within one such pair. The
//! types here carry the full key material together so that no API surface
//! ever has to pass around a bare, ambiguous `id`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The `(account_id, company_id)` pair that partitions all business data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantScope {
    pub account_id: i32,
    pub company_id: i32,
}

impl TenantScope {
    pub fn new(account_id: i32, company_id: i32) -> Self {
        Self {
            account_id,
            company_id,
        }
    }

    /// Full composite key for an entity in this scope.
    pub fn key(&self, id: i32) -> ScopedKey {
        ScopedKey {
            account_id: self.account_id,
            company_id: self.company_id,
            id,
        }
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account_id, self.company_id)
    }
}

/// The composite `(account_id, company_id, id)` key of a tenant-scoped row.
///
/// This triple is the only globally reliable identifier in the system. Any
/// reference between tenant-scoped entities must carry all three legs;
/// decomposing to a bare `id` loses the tenant and is a correctness bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopedKey {
    pub account_id: i32,
    pub company_id: i32,
    pub id: i32,
}

impl ScopedKey {
    pub fn new(scope: TenantScope, id: i32) -> Self {
        scope.key(id)
    }

    pub fn scope(&self) -> TenantScope {
        TenantScope::new(self.account_id, self.company_id)
    }
}

impl fmt::Display for ScopedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.account_id, self.company_id, self.id)
    }
}

/// Authenticated request context supplied by the (external) auth layer.
///
/// Keystone trusts this tuple completely; role checks happen before it is
/// constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub scope: TenantScope,
    pub user_id: i32,
    pub role: String,
}

impl AuthContext {
    pub fn new(scope: TenantScope, user_id: i32, role: impl Into<String>) -> Self {
        Self {
            scope,
            user_id,
            role: role.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_key_round_trip() {
        let scope = TenantScope::new(7, 3);
        let key = scope.key(42);
        assert_eq!(key.scope(), scope);
        assert_eq!(key.id, 42);
        assert_eq!(key.to_string(), "7/3/42");
    }

    #[test]
    fn test_same_id_different_scope_is_distinct() {
        let a = TenantScope::new(1, 1).key(5);
        let b = TenantScope::new(1, 2).key(5);
        assert_ne!(a, b);
    }
}
