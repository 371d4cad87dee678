//! Command-line interface for Identra.

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::db::migrator::{MigrationError, Migrator};
use crate::db::{NewUser, Store};
use crate::entities::users::Role;
use crate::state::SharedState;

/// Identra - identity & credential lifecycle service
#[derive(Parser)]
#[command(name = "identra")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    #[command(alias = "-s", alias = "--serve")]
    Serve,

    /// Apply schema migrations and verify the resulting structure
    Migrate,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage user records
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user record
    Add {
        email: String,
        #[arg(long)]
        display_name: Option<String>,
        /// "admin" or "standard"
        #[arg(long, default_value = "standard")]
        role: String,
        /// Provision a password credential right away
        #[arg(long)]
        password: Option<String>,
    },

    /// List all user records
    #[command(alias = "ls")]
    List,

    /// Set a user's password credential
    SetPassword { email: String, password: String },

    /// Mark a user inactive without deleting the record
    Deactivate { email: String },

    /// Delete a user record
    #[command(alias = "rm")]
    Remove { email: String },
}

pub async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    let store = Store::connect(&config.general.database_path, 1, 1).await?;

    match Migrator::up(&store.conn).await {
        Ok(()) => {
            println!("✓ Schema is up to date");
            Ok(())
        }
        Err(MigrationError::PartialFailure(missing)) => {
            println!("✗ Migration finished but the structure is incomplete:");
            for item in &missing {
                println!("    missing: {item}");
            }
            anyhow::bail!("schema verification failed")
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn cmd_user(config: &Config, command: UserCommands) -> anyhow::Result<()> {
    match command {
        UserCommands::Add {
            email,
            display_name,
            role,
            password,
        } => {
            let role = Role::parse(&role)
                .ok_or_else(|| anyhow::anyhow!("Unknown role '{role}' (use admin or standard)"))?;

            let state = SharedState::new(config.clone()).await?;
            let user = state
                .store
                .insert_user(NewUser {
                    email,
                    display_name,
                    role,
                    password_hash: None,
                })
                .await?;

            if let Some(password) = password {
                state.credentials.set_password(user.id, &password).await?;
                println!("✓ Created user {} (ID: {}) with password", user.email, user.id);
            } else {
                println!("✓ Created user {} (ID: {})", user.email, user.id);
                println!("  No credential yet. Set one with:");
                println!("  identra user set-password {} <password>", user.email);
            }
            Ok(())
        }

        UserCommands::List => {
            let store = Store::new(&config.general.database_path).await?;
            let users = store.list_users().await?;

            if users.is_empty() {
                println!("No user records.");
                println!();
                println!("Add one with: identra user add <email>");
                return Ok(());
            }

            println!("Users ({} total)", users.len());
            println!("{:-<70}", "");

            for user in users {
                let state = if user.is_active { "●" } else { "○" };
                let name = user.display_name.as_deref().unwrap_or("-");

                println!("{} {} [{}]", state, user.email, name);
                println!(
                    "  ID: {} | Role: {:?} | Method: {:?} | Last login: {}",
                    user.id,
                    user.role,
                    user.login_method,
                    user.last_login.as_deref().unwrap_or("never")
                );
            }

            println!();
            println!("Legend: ● Active | ○ Inactive");
            Ok(())
        }

        UserCommands::SetPassword { email, password } => {
            let state = SharedState::new(config.clone()).await?;
            let user = state
                .store
                .get_user_by_email(&email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No user with email {email}"))?;

            state.credentials.set_password(user.id, &password).await?;
            println!("✓ Password updated for {}", user.email);
            Ok(())
        }

        UserCommands::Deactivate { email } => {
            let store = Store::new(&config.general.database_path).await?;
            let user = store
                .get_user_by_email(&email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No user with email {email}"))?;

            store.user_repo().set_active(user.id, false).await?;
            println!("✓ Deactivated {}", user.email);
            Ok(())
        }

        UserCommands::Remove { email } => {
            let store = Store::new(&config.general.database_path).await?;
            let user = store
                .get_user_by_email(&email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No user with email {email}"))?;

            store.remove_user(user.id).await?;
            println!("✓ Removed {}", user.email);
            Ok(())
        }
    }
}
