use sea_orm_migration::prelude::*;

use super::MigrationStep;

/// Base user table. Columns the record store accumulated before the repair
/// pass existed are created nullable here; historical rows genuinely held
/// NULL (and zero-sentinel) values in them, and the repair step is what
/// establishes the non-null invariants.
pub struct Migration;

#[async_trait::async_trait]
impl MigrationStep for Migration {
    fn name(&self) -> &'static str {
        "m20240105_create_users"
    }

    async fn apply(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::Role).string_len(16).null())
                    .col(ColumnDef::new(Users::IsActive).boolean().null())
                    .col(ColumnDef::new(Users::CreatedAt).string().null())
                    .col(ColumnDef::new(Users::UpdatedAt).string().null())
                    .col(ColumnDef::new(Users::LastLogin).string().null())
                    .col(ColumnDef::new(Users::PasswordHash).string().null())
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    Role,
    IsActive,
    CreatedAt,
    UpdatedAt,
    LastLogin,
    PasswordHash,
}
