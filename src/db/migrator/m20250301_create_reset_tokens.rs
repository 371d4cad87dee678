use sea_orm_migration::prelude::*;

use super::MigrationStep;

pub struct Migration;

#[async_trait::async_trait]
impl MigrationStep for Migration {
    fn name(&self) -> &'static str {
        "m20250301_create_reset_tokens"
    }

    async fn apply(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ResetTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResetTokens::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ResetTokens::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ResetTokens::UserId).integer().not_null())
                    .col(ColumnDef::new(ResetTokens::ExpiresAt).string().not_null())
                    .col(
                        ColumnDef::new(ResetTokens::Consumed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ResetTokens::CreatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Speeds up the per-user expiry sweep.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reset_tokens_user_id")
                    .table(ResetTokens::Table)
                    .col(ResetTokens::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ResetTokens {
    Table,
    Id,
    Token,
    UserId,
    ExpiresAt,
    Consumed,
    CreatedAt,
}
