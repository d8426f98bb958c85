//! Tenant guard for ad hoc queries
//!
//! The typed store in [`crate::scoped`] already forces the tenant pair onto
//! every entity query. Reports and cross-entity joins that drop down to raw
//! `sea_query` statements get the same guarantee from [`TenantGuard`]: every
//! table (or alias) enters the statement through the guard, and when the
//! table is in the scoped registry the guard appends its
//! `account_id = ? AND company_id = ?` predicate on the spot. A touched
//! table cannot escape the filter because there is no other way in.

use keystone_api_types::TenantScope;
use sea_query::{Alias, Condition, Expr, SelectStatement, SimpleExpr};

/// Tables partitioned by the tenant pair. Global lookups (accounts,
/// companies, unit_categories, document_types) are deliberately absent.
pub const SCOPED_TABLES: &[&str] = &[
    "properties",
    "units",
    "vendors",
    "vendor_leases",
    "vendor_lease_terms",
    "vendor_lease_coverages",
    "renters",
    "renter_contacts",
    "renter_documents",
];

pub fn is_scoped_table(table: &str) -> bool {
    SCOPED_TABLES.contains(&table)
}

/// Builder for tenant-constrained `SELECT` statements.
pub struct TenantGuard {
    scope: TenantScope,
    stmt: SelectStatement,
}

impl TenantGuard {
    pub fn new(scope: TenantScope) -> Self {
        Self {
            scope,
            stmt: SelectStatement::new(),
        }
    }

    pub fn from_table(mut self, table: &str) -> Self {
        self.stmt.from(Alias::new(table));
        self.constrain(table, table);
        self
    }

    pub fn from_table_as(mut self, table: &str, alias: &str) -> Self {
        self.stmt.from_as(Alias::new(table), Alias::new(alias));
        self.constrain(table, alias);
        self
    }

    pub fn inner_join(mut self, table: &str, on: SimpleExpr) -> Self {
        self.stmt
            .inner_join(Alias::new(table), Condition::all().add(on));
        self.constrain(table, table);
        self
    }

    pub fn inner_join_as(mut self, table: &str, alias: &str, on: SimpleExpr) -> Self {
        self.stmt.join_as(
            sea_query::JoinType::InnerJoin,
            Alias::new(table),
            Alias::new(alias),
            Condition::all().add(on),
        );
        self.constrain(table, alias);
        self
    }

    pub fn column(mut self, table: &str, column: &str) -> Self {
        self.stmt.column((Alias::new(table), Alias::new(column)));
        self
    }

    pub fn expr(mut self, expr: SimpleExpr) -> Self {
        self.stmt.expr(expr);
        self
    }

    pub fn and_where(mut self, predicate: SimpleExpr) -> Self {
        self.stmt.and_where(predicate);
        self
    }

    /// Finish building. The statement carries the tenant predicate for every
    /// scoped table that was added.
    pub fn into_select(self) -> SelectStatement {
        self.stmt
    }

    fn constrain(&mut self, table: &str, alias: &str) {
        if !is_scoped_table(table) {
            return;
        }
        let account = Expr::col((Alias::new(alias), Alias::new("account_id")));
        let company = Expr::col((Alias::new(alias), Alias::new("company_id")));
        self.stmt
            .and_where(account.eq(self.scope.account_id))
            .and_where(company.eq(self.scope.company_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::SqliteQueryBuilder;

    fn sql(guard: TenantGuard) -> String {
        guard.into_select().to_string(SqliteQueryBuilder)
    }

    #[test]
    fn test_scoped_table_gets_tenant_predicate() {
        let scope = TenantScope::new(1, 2);
        let query = sql(TenantGuard::new(scope)
            .from_table("units")
            .column("units", "unit_code"));
        assert!(query.contains(r#""units"."account_id" = 1"#));
        assert!(query.contains(r#""units"."company_id" = 2"#));
    }

    #[test]
    fn test_global_table_is_left_alone() {
        let scope = TenantScope::new(1, 2);
        let query = sql(TenantGuard::new(scope)
            .from_table("unit_categories")
            .column("unit_categories", "code"));
        assert!(!query.contains("account_id"));
    }

    #[test]
    fn test_join_through_alias_is_constrained() {
        let scope = TenantScope::new(4, 9);
        let on = Expr::col((Alias::new("u"), Alias::new("property_id")))
            .equals((Alias::new("p"), Alias::new("id")));
        let query = sql(TenantGuard::new(scope)
            .from_table_as("units", "u")
            .inner_join_as("properties", "p", on)
            .column("u", "unit_code")
            .column("p", "property_name"));
        assert!(query.contains(r#""u"."account_id" = 4"#));
        assert!(query.contains(r#""p"."account_id" = 4"#));
        assert!(query.contains(r#""u"."company_id" = 9"#));
        assert!(query.contains(r#""p"."company_id" = 9"#));
    }

    #[test]
    fn test_every_scoped_table_is_registered() {
        for table in [
            "properties",
            "units",
            "vendors",
            "vendor_leases",
            "vendor_lease_terms",
            "vendor_lease_coverages",
            "renters",
            "renter_contacts",
            "renter_documents",
        ] {
            assert!(is_scoped_table(table), "{table} missing from registry");
        }
        assert!(!is_scoped_table("accounts"));
        assert!(!is_scoped_table("companies"));
    }
}
