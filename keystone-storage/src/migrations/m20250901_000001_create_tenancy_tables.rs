use sea_orm_migration::prelude::*;

use super::timestamps;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                timestamps(
                    Table::create()
                        .table(Accounts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Accounts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Accounts::Uuid).uuid().not_null())
                        .col(ColumnDef::new(Accounts::Name).string().not_null().unique_key())
                        .col(
                            ColumnDef::new(Accounts::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        ),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                timestamps(
                    Table::create()
                        .table(Companies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Companies::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Companies::Uuid).uuid().not_null())
                        .col(ColumnDef::new(Companies::AccountId).integer().not_null())
                        .col(ColumnDef::new(Companies::Name).string().not_null())
                        .col(
                            ColumnDef::new(Companies::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_companies_account")
                                .from(Companies::Table, Companies::AccountId)
                                .to(Accounts::Table, Accounts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        ),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UnitCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UnitCategories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UnitCategories::Code)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UnitCategories::Name).string().not_null())
                    .col(ColumnDef::new(UnitCategories::Description).text())
                    .col(
                        ColumnDef::new(UnitCategories::IsResidential)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UnitCategories::IsCommercial)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(UnitCategories::AllowedParentCategories).json())
                    .col(
                        ColumnDef::new(UnitCategories::MaxDepth)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(UnitCategories::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentTypes::Code)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DocumentTypes::Name).string().not_null())
                    .col(ColumnDef::new(DocumentTypes::ApplicableTo).string_len(16))
                    .col(
                        ColumnDef::new(DocumentTypes::IsMandatory)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(DocumentTypes::ValidityMonths).integer())
                    .col(
                        ColumnDef::new(DocumentTypes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UnitCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Uuid,
    Name,
    IsActive,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Uuid,
    AccountId,
    Name,
    IsActive,
}

#[derive(DeriveIden)]
enum UnitCategories {
    Table,
    Id,
    Code,
    Name,
    Description,
    IsResidential,
    IsCommercial,
    AllowedParentCategories,
    MaxDepth,
    IsActive,
}

#[derive(DeriveIden)]
enum DocumentTypes {
    Table,
    Id,
    Code,
    Name,
    ApplicableTo,
    IsMandatory,
    ValidityMonths,
    IsActive,
}
