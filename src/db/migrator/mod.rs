//! Probe-based schema migration engine.
//!
//! The store carries no migration-version ledger: historical schema drift
//! means a ledger could disagree with the structure it describes. Instead,
//! every run executes the full ordered step list, and each step derives
//! "already applied" from the live structure itself (`has_column`,
//! `if_not_exists`). Structural steps run before value backfill, since the
//! backfill targets columns the structural steps introduce. After the last
//! step the expected structure is re-probed; anything missing is a partial
//! failure, never a silent success.
//!
//! Exactly one migrator instance must run at a time; that exclusivity is the
//! deployment's responsibility (advisory lock or deployment ordering). Two
//! racing instances can both see "column absent" and one will fail its ALTER.

use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;
use thiserror::Error;
use tracing::info;

mod m20240105_create_users;
mod m20250214_add_facial_credentials;
mod m20250214_add_login_method;
mod m20250301_create_reset_tokens;
mod m20250302_repair_row_defaults;

/// One ordered, re-runnable unit of schema evolution. `apply` must be safe to
/// execute against a store where the step already ran: probe first, mutate
/// only when the probe says the change is absent.
#[async_trait::async_trait]
pub trait MigrationStep: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(&self, manager: &SchemaManager) -> Result<(), DbErr>;
}

#[derive(Debug, Error)]
pub enum MigrationError {
    /// A structural or backfill step failed for a reason other than "already
    /// exists" (which the probes absorb). Remaining steps were not attempted.
    #[error("migration step '{step}' failed: {source}")]
    Step {
        step: &'static str,
        source: DbErr,
    },

    /// Post-apply verification found expected structure missing. Fatal to
    /// startup; requires operator attention, not a retry loop.
    #[error("schema verification failed, missing: {0:?}")]
    PartialFailure(Vec<String>),

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Every (table, column) the migration sequence is expected to leave behind.
const EXPECTED_COLUMNS: &[(&str, &str)] = &[
    ("users", "id"),
    ("users", "email"),
    ("users", "display_name"),
    ("users", "role"),
    ("users", "is_active"),
    ("users", "created_at"),
    ("users", "updated_at"),
    ("users", "last_login"),
    ("users", "login_method"),
    ("users", "facial_descriptor"),
    ("users", "facial_registered_at"),
    ("users", "facial_metadata"),
    ("reset_tokens", "id"),
    ("reset_tokens", "token"),
    ("reset_tokens", "user_id"),
    ("reset_tokens", "expires_at"),
    ("reset_tokens", "consumed"),
    ("reset_tokens", "created_at"),
];

pub struct Migrator;

impl Migrator {
    fn steps() -> Vec<Box<dyn MigrationStep>> {
        vec![
            Box::new(m20240105_create_users::Migration),
            Box::new(m20250214_add_login_method::Migration),
            Box::new(m20250214_add_facial_credentials::Migration),
            Box::new(m20250301_create_reset_tokens::Migration),
            Box::new(m20250302_repair_row_defaults::Migration),
        ]
    }

    /// Applies the full step list in order, then verifies the structure.
    pub async fn up(conn: &DatabaseConnection) -> Result<(), MigrationError> {
        let manager = SchemaManager::new(conn);

        for step in Self::steps() {
            info!(step = step.name(), "applying migration step");
            step.apply(&manager)
                .await
                .map_err(|source| MigrationError::Step {
                    step: step.name(),
                    source,
                })?;
        }

        Self::verify(&manager).await?;
        info!("schema migration complete");
        Ok(())
    }

    /// Re-probes every expected column without mutating anything.
    pub async fn verify_structure(conn: &DatabaseConnection) -> Result<(), MigrationError> {
        let manager = SchemaManager::new(conn);
        Self::verify(&manager).await
    }

    async fn verify(manager: &SchemaManager<'_>) -> Result<(), MigrationError> {
        let mut missing = Vec::new();

        for (table, column) in EXPECTED_COLUMNS {
            if !manager.has_column(*table, *column).await? {
                missing.push(format!("{table}.{column}"));
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MigrationError::PartialFailure(missing))
        }
    }
}
