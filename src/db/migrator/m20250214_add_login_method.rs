use sea_orm_migration::prelude::*;

use super::MigrationStep;

pub struct Migration;

#[async_trait::async_trait]
impl MigrationStep for Migration {
    fn name(&self) -> &'static str {
        "m20250214_add_login_method"
    }

    async fn apply(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("users", "login_method").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .add_column(
                            ColumnDef::new(Users::LoginMethod)
                                .string_len(16)
                                .not_null()
                                .default("password"),
                        )
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
    LoginMethod,
}
