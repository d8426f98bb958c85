use sea_orm_migration::prelude::*;

use super::{scoped_foreign_key, scoped_table, scoped_uuid_index, timestamps};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                timestamps(
                    scoped_table("vendors")
                        .col(
                            ColumnDef::new(Alias::new("vendor_code"))
                                .string_len(50)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Alias::new("vendor_name")).string().not_null())
                        .col(ColumnDef::new(Alias::new("contact_email")).string())
                        .col(ColumnDef::new(Alias::new("contact_phone")).string_len(32))
                        .col(
                            ColumnDef::new(Alias::new("is_active"))
                                .boolean()
                                .not_null()
                                .default(true),
                        ),
                )
                .to_owned(),
            )
            .await?;

        manager.create_index(scoped_uuid_index("vendors")).await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_vendors_acct_comp_code")
                    .table(Alias::new("vendors"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("vendor_code"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                timestamps(
                    scoped_table("vendor_leases")
                        .col(ColumnDef::new(Alias::new("vendor_id")).integer().not_null())
                        .col(
                            ColumnDef::new(Alias::new("lease_code"))
                                .string_len(50)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Alias::new("start_date")).date().not_null())
                        .col(ColumnDef::new(Alias::new("end_date")).date().not_null())
                        .col(
                            ColumnDef::new(Alias::new("rent_amount"))
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Alias::new("currency"))
                                .string_len(3)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Alias::new("billing_cycle"))
                                .string_len(32)
                                .not_null()
                                .default("monthly"),
                        )
                        .col(ColumnDef::new(Alias::new("security_deposit")).decimal_len(12, 2))
                        .col(
                            ColumnDef::new(Alias::new("status"))
                                .string_len(32)
                                .not_null()
                                .default("draft"),
                        )
                        .col(ColumnDef::new(Alias::new("termination_reason")).string())
                        .col(ColumnDef::new(Alias::new("notes")).text())
                        .foreign_key(&mut scoped_foreign_key(
                            "vendor_leases",
                            "vendor_id",
                            "vendors",
                        )),
                )
                .to_owned(),
            )
            .await?;

        manager.create_index(scoped_uuid_index("vendor_leases")).await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_vendor_leases_acct_comp_code")
                    .table(Alias::new("vendor_leases"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("lease_code"))
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_vendor_leases_vendor")
                    .table(Alias::new("vendor_leases"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("vendor_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                timestamps(
                    scoped_table("vendor_lease_terms")
                        .col(ColumnDef::new(Alias::new("lease_id")).integer().not_null())
                        .col(ColumnDef::new(Alias::new("term_number")).integer().not_null())
                        .col(ColumnDef::new(Alias::new("start_date")).date().not_null())
                        .col(ColumnDef::new(Alias::new("end_date")).date().not_null())
                        .col(
                            ColumnDef::new(Alias::new("rent_amount"))
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Alias::new("reason")).string())
                        .foreign_key(&mut scoped_foreign_key(
                            "vendor_lease_terms",
                            "lease_id",
                            "vendor_leases",
                        )),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_index(scoped_uuid_index("vendor_lease_terms"))
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_vendor_lease_terms_lease_number")
                    .table(Alias::new("vendor_lease_terms"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("lease_id"))
                    .col(Alias::new("term_number"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                timestamps(
                    scoped_table("vendor_lease_coverages")
                        .col(ColumnDef::new(Alias::new("lease_id")).integer().not_null())
                        .col(
                            ColumnDef::new(Alias::new("scope_type"))
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Alias::new("property_id")).integer().not_null())
                        .col(ColumnDef::new(Alias::new("unit_id")).integer())
                        .foreign_key(&mut scoped_foreign_key(
                            "vendor_lease_coverages",
                            "lease_id",
                            "vendor_leases",
                        ))
                        .foreign_key(&mut scoped_foreign_key(
                            "vendor_lease_coverages",
                            "property_id",
                            "properties",
                        )),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_index(scoped_uuid_index("vendor_lease_coverages"))
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_vendor_lease_coverages_lease")
                    .table(Alias::new("vendor_lease_coverages"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("lease_id"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("vendor_lease_coverages")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("vendor_lease_terms")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("vendor_leases")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("vendors")).to_owned())
            .await?;
        Ok(())
    }
}
