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
                    scoped_table("properties")
                        .col(
                            ColumnDef::new(Alias::new("property_code"))
                                .string_len(50)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Alias::new("property_name")).string().not_null())
                        .col(
                            ColumnDef::new(Alias::new("usage_type"))
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Alias::new("address_line_1")).string())
                        .col(ColumnDef::new(Alias::new("city")).string())
                        .col(ColumnDef::new(Alias::new("country")).string())
                        .col(ColumnDef::new(Alias::new("total_floors")).integer())
                        .col(ColumnDef::new(Alias::new("year_built")).integer())
                        .col(
                            ColumnDef::new(Alias::new("status"))
                                .string_len(32)
                                .not_null()
                                .default("active"),
                        )
                        .col(ColumnDef::new(Alias::new("notes")).text())
                        .col(
                            ColumnDef::new(Alias::new("is_deleted"))
                                .boolean()
                                .not_null()
                                .default(false),
                        ),
                )
                .to_owned(),
            )
            .await?;

        manager.create_index(scoped_uuid_index("properties")).await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_properties_acct_comp_code")
                    .table(Alias::new("properties"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("property_code"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                timestamps(
                    scoped_table("units")
                        .col(ColumnDef::new(Alias::new("property_id")).integer().not_null())
                        .col(ColumnDef::new(Alias::new("parent_unit_id")).integer())
                        .col(
                            ColumnDef::new(Alias::new("unit_code"))
                                .string_len(50)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Alias::new("display_name")).string())
                        .col(ColumnDef::new(Alias::new("category_id")).integer().not_null())
                        .col(ColumnDef::new(Alias::new("floor_number")).string_len(16))
                        .col(ColumnDef::new(Alias::new("area_sqm")).decimal_len(10, 2))
                        .col(
                            ColumnDef::new(Alias::new("capacity"))
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Alias::new("is_leaf"))
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Alias::new("status"))
                                .string_len(32)
                                .not_null()
                                .default("available"),
                        )
                        .col(ColumnDef::new(Alias::new("notes")).text())
                        .foreign_key(&mut scoped_foreign_key("units", "property_id", "properties"))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_units_category")
                                .from(Alias::new("units"), Alias::new("category_id"))
                                .to(Alias::new("unit_categories"), Alias::new("id")),
                        ),
                )
                .to_owned(),
            )
            .await?;

        manager.create_index(scoped_uuid_index("units")).await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_units_acct_comp_property_code")
                    .table(Alias::new("units"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("property_id"))
                    .col(Alias::new("unit_code"))
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_units_parent")
                    .table(Alias::new("units"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("parent_unit_id"))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_units_property")
                    .table(Alias::new("units"))
                    .col(Alias::new("account_id"))
                    .col(Alias::new("company_id"))
                    .col(Alias::new("property_id"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("units")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("properties")).to_owned())
            .await?;
        Ok(())
    }
}
