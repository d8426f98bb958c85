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
                    scoped_table("renters")
                        .col(
                            ColumnDef::new(Alias::new("tenant_code"))
                                .string_len(50)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Alias::new("renter_type"))
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Alias::new("display_name")).string().not_null())
                        .col(ColumnDef::new(Alias::new("email")).string())
                        .col(ColumnDef::new(Alias::new("phone")).string_len(32))
                        .col(
                            ColumnDef::new(Alias::new("kyc_status"))
                                .string_len(32)
                                .not_null()
                                .default("not_started"),
                        )
                        .col(ColumnDef::new(Alias::new("kyc_verified_at")).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(Alias::new("status"))
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        ),
                )
                .to_owned(),
            )
            .await?;

        manager.create_index(scoped_uuid_index("renters")).await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_renters_acct_comp_code")
                    .table(Alias::new("renters"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("tenant_code"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                timestamps(
                    scoped_table("renter_contacts")
                        .col(ColumnDef::new(Alias::new("renter_id")).integer().not_null())
                        .col(ColumnDef::new(Alias::new("full_name")).string().not_null())
                        .col(ColumnDef::new(Alias::new("role")).string_len(64))
                        .col(ColumnDef::new(Alias::new("email")).string())
                        .col(ColumnDef::new(Alias::new("phone")).string_len(32))
                        .col(
                            ColumnDef::new(Alias::new("is_primary"))
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .foreign_key(&mut scoped_foreign_key(
                            "renter_contacts",
                            "renter_id",
                            "renters",
                        )),
                )
                .to_owned(),
            )
            .await?;

        manager.create_index(scoped_uuid_index("renter_contacts")).await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_renter_contacts_renter")
                    .table(Alias::new("renter_contacts"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("renter_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                timestamps(
                    scoped_table("renter_documents")
                        .col(ColumnDef::new(Alias::new("renter_id")).integer().not_null())
                        .col(
                            ColumnDef::new(Alias::new("document_type_id"))
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Alias::new("file_ref")).string())
                        .col(ColumnDef::new(Alias::new("issued_at")).date())
                        .col(ColumnDef::new(Alias::new("expires_at")).date())
                        .col(
                            ColumnDef::new(Alias::new("verification_status"))
                                .string_len(16)
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(Alias::new("verified_at")).timestamp_with_time_zone())
                        .col(ColumnDef::new(Alias::new("rejection_reason")).string())
                        .foreign_key(&mut scoped_foreign_key(
                            "renter_documents",
                            "renter_id",
                            "renters",
                        ))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_renter_documents_document_type")
                                .from(
                                    Alias::new("renter_documents"),
                                    Alias::new("document_type_id"),
                                )
                                .to(Alias::new("document_types"), Alias::new("id")),
                        ),
                )
                .to_owned(),
            )
            .await?;

        manager.create_index(scoped_uuid_index("renter_documents")).await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_renter_documents_renter")
                    .table(Alias::new("renter_documents"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("renter_id"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("renter_documents")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("renter_contacts")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("renters")).to_owned())
            .await?;
        Ok(())
    }
}
