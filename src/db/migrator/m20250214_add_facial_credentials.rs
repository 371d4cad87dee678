use sea_orm_migration::prelude::*;

use super::MigrationStep;

/// Facial credential columns. Each column is guarded individually so a run
/// interrupted halfway through resumes cleanly.
pub struct Migration;

#[async_trait::async_trait]
impl MigrationStep for Migration {
    fn name(&self) -> &'static str {
        "m20250214_add_facial_credentials"
    }

    async fn apply(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("users", "facial_descriptor").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .add_column(ColumnDef::new(Users::FacialDescriptor).text().null())
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_column("users", "facial_registered_at").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .add_column(ColumnDef::new(Users::FacialRegisteredAt).string().null())
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_column("users", "facial_metadata").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .add_column(ColumnDef::new(Users::FacialMetadata).text().null())
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    FacialDescriptor,
    FacialRegisteredAt,
    FacialMetadata,
}
