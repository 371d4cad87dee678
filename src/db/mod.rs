use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::token::TokenRepository;
pub use repositories::user::{NewUser, UserPatch, UserRepository, normalize_email};

use crate::entities::users;

/// Handle to the record store. Cheap to clone; owns the connection pool and
/// hands out repositories. Construction applies the schema migration pass, so
/// by the time a `Store` exists the structure is verified and historical row
/// defects are repaired.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        let store = Self::connect(db_url, max_connections, min_connections).await?;

        migrator::Migrator::up(&store.conn)
            .await
            .context("schema migration failed")?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(store)
    }

    /// Opens the pool without running migrations. Used by the `migrate` CLI
    /// command (which wants the typed migration outcome) and by tests that
    /// stage legacy fixtures before the migrator runs.
    pub async fn connect(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn token_repo(&self) -> TokenRepository {
        TokenRepository::new(self.conn.clone())
    }

    // Convenience delegations used by the API handlers and CLI commands.

    pub async fn insert_user(&self, user: NewUser) -> Result<users::Model, crate::errors::IdentityError> {
        self.user_repo().insert(user).await
    }

    pub async fn get_user_by_id(
        &self,
        id: i32,
    ) -> Result<Option<users::Model>, crate::errors::IdentityError> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<users::Model>, crate::errors::IdentityError> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<users::Model>, crate::errors::IdentityError> {
        self.user_repo().list_all().await
    }

    pub async fn remove_user(&self, id: i32) -> Result<bool, crate::errors::IdentityError> {
        self.user_repo().remove(id).await
    }
}
