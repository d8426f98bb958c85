use sea_orm_migration::prelude::*;

mod m20250901_000001_create_tenancy_tables;
mod m20250901_000002_create_property_tables;
mod m20250901_000003_create_vendor_tables;
mod m20250901_000004_create_renter_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_tenancy_tables::Migration),
            Box::new(m20250901_000002_create_property_tables::Migration),
            Box::new(m20250901_000003_create_vendor_tables::Migration),
            Box::new(m20250901_000004_create_renter_tables::Migration),
        ]
    }
}

/// Columns shared by every tenant-scoped table: the composite primary key
/// `(account_id, company_id, id)`, the uuid secondary key, and FKs from the
/// tenant pair back to the tenancy tables.
pub(crate) fn scoped_table(name: &str) -> TableCreateStatement {
    let table = Alias::new(name);
    Table::create()
        .table(table.clone())
        .if_not_exists()
        .col(ColumnDef::new(Alias::new("account_id")).integer().not_null())
        .col(ColumnDef::new(Alias::new("company_id")).integer().not_null())
        .col(ColumnDef::new(Alias::new("id")).integer().not_null())
        .col(ColumnDef::new(Alias::new("uuid")).uuid().not_null())
        .primary_key(
            Index::create()
                .col(Alias::new("account_id"))
                .col(Alias::new("company_id"))
                .col(Alias::new("id")),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{name}_account"))
                .from(table.clone(), Alias::new("account_id"))
                .to(Alias::new("accounts"), Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{name}_company"))
                .from(table, Alias::new("company_id"))
                .to(Alias::new("companies"), Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

/// `created_at` / `updated_at` with server-side defaults.
pub(crate) fn timestamps(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Alias::new("updated_at"))
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
}

/// The `(account_id, company_id, uuid)` unique constraint carried by every
/// tenant-scoped table.
pub(crate) fn scoped_uuid_index(name: &str) -> IndexCreateStatement {
    Index::create()
        .name(format!("uq_{name}_acct_comp_uuid"))
        .table(Alias::new(name))
        .col(Alias::new("account_id"))
        .col(Alias::new("company_id"))
        .col(Alias::new("uuid"))
        .unique()
        .to_owned()
}

/// A composite foreign key from a tenant-scoped table to another one in the
/// same scope. The tenant pair rides along; a bare-id reference would be
/// ambiguous across tenants.
pub(crate) fn scoped_foreign_key(
    from_table: &str,
    from_col: &str,
    to_table: &str,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(format!("fk_{from_table}_{from_col}"))
        .from(
            Alias::new(from_table),
            (
                Alias::new("account_id"),
                Alias::new("company_id"),
                Alias::new(from_col),
            ),
        )
        .to(
            Alias::new(to_table),
            (
                Alias::new("account_id"),
                Alias::new("company_id"),
                Alias::new("id"),
            ),
        )
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}
