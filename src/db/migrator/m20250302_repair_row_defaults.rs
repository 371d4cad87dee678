use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, Statement};
use tracing::info;

use super::MigrationStep;

/// Repairs historically defective values in bulk. Timestamps that are NULL,
/// empty, or the all-zero sentinel become this run's timestamp; NULL
/// `is_active` becomes true; NULL/empty `role` becomes `standard`. Every
/// predicate only matches defective rows, so a re-run against a clean store
/// updates nothing.
///
/// Runs last: it targets columns the structural steps introduce.
pub struct Migration;

const REPAIRS: &[(&str, &str)] = &[
    (
        "created_at",
        "UPDATE users SET created_at = ? \
         WHERE created_at IS NULL OR created_at = '' OR created_at LIKE '0000-%'",
    ),
    (
        "updated_at",
        "UPDATE users SET updated_at = ? \
         WHERE updated_at IS NULL OR updated_at = '' OR updated_at LIKE '0000-%'",
    ),
];

#[async_trait::async_trait]
impl MigrationStep for Migration {
    fn name(&self) -> &'static str {
        "m20250302_repair_row_defaults"
    }

    async fn apply(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();
        let now = chrono::Utc::now().to_rfc3339();

        for &(column, sql) in REPAIRS {
            let result = conn
                .execute(Statement::from_sql_and_values(
                    backend,
                    sql,
                    [now.clone().into()],
                ))
                .await?;
            if result.rows_affected() > 0 {
                info!(column, rows = result.rows_affected(), "repaired defective timestamps");
            }
        }

        // Legacy rows can carry updated_at earlier than created_at; clamp so
        // the updated_at >= created_at invariant holds store-wide.
        let clamped = conn
            .execute(Statement::from_string(
                backend,
                "UPDATE users SET updated_at = created_at WHERE updated_at < created_at",
            ))
            .await?;
        if clamped.rows_affected() > 0 {
            info!(rows = clamped.rows_affected(), "clamped updated_at to created_at");
        }

        let activated = conn
            .execute(Statement::from_string(
                backend,
                "UPDATE users SET is_active = 1 WHERE is_active IS NULL",
            ))
            .await?;
        if activated.rows_affected() > 0 {
            info!(rows = activated.rows_affected(), "defaulted is_active to true");
        }

        let roled = conn
            .execute(Statement::from_string(
                backend,
                "UPDATE users SET role = 'standard' WHERE role IS NULL OR role = ''",
            ))
            .await?;
        if roled.rows_affected() > 0 {
            info!(rows = roled.rows_affected(), "defaulted role to standard");
        }

        Ok(())
    }
}
