use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::users::{self, LoginMethod, Role};
use crate::errors::{IdentityError, map_unique_violation};

/// Canonical form of the external lookup key. Every email that enters the
/// store or is used for a lookup goes through this first.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Fields a caller supplies at insert time. Everything else (timestamps,
/// activity flag, login method) is owned by the repository.
pub struct NewUser {
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub password_hash: Option<String>,
}

/// Partial update. `display_name` is doubly optional so a caller can
/// distinguish "leave as is" from "clear it".
#[derive(Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub display_name: Option<Option<String>>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, user: NewUser) -> Result<users::Model, IdentityError> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            email: Set(normalize_email(&user.email)),
            display_name: Set(user.display_name),
            role: Set(user.role),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            last_login: Set(None),
            login_method: Set(LoginMethod::Password),
            password_hash: Set(user.password_hash),
            facial_descriptor: Set(None),
            facial_registered_at: Set(None),
            facial_metadata: Set(None),
            ..Default::default()
        };

        active.insert(&self.conn).await.map_err(map_unique_violation)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>, IdentityError> {
        Ok(users::Entity::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>, IdentityError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(&self.conn)
            .await?)
    }

    /// Lookup that treats a miss as [`IdentityError::NotFound`], for write
    /// paths where the caller already holds an id.
    pub async fn require_by_id(&self, id: i32) -> Result<users::Model, IdentityError> {
        self.get_by_id(id).await?.ok_or(IdentityError::NotFound)
    }

    /// Applies a partial field set. `updated_at` is bumped as part of the
    /// same write; `created_at` is never touched.
    pub async fn update(&self, id: i32, patch: UserPatch) -> Result<users::Model, IdentityError> {
        let user = self.require_by_id(id).await?;

        let mut active: users::ActiveModel = user.into();
        if let Some(email) = patch.email {
            active.email = Set(normalize_email(&email));
        }
        if let Some(display_name) = patch.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(role) = patch.role {
            active.role = Set(role);
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active.update(&self.conn).await.map_err(map_unique_violation)
    }

    /// Stores a new password hash and makes the password path authoritative.
    pub async fn set_password_hash(&self, id: i32, hash: &str) -> Result<users::Model, IdentityError> {
        let user = self.require_by_id(id).await?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(Some(hash.to_string()));
        active.login_method = Set(LoginMethod::Password);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(active.update(&self.conn).await?)
    }

    /// Stores the facial credential. Leaves `login_method` alone; switching
    /// the active method is a separate operation.
    pub async fn set_facial_credential(
        &self,
        id: i32,
        descriptor_json: &str,
        metadata: Option<String>,
    ) -> Result<users::Model, IdentityError> {
        let user = self.require_by_id(id).await?;
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.facial_descriptor = Set(Some(descriptor_json.to_string()));
        active.facial_registered_at = Set(Some(now.clone()));
        active.facial_metadata = Set(metadata);
        active.updated_at = Set(now);

        Ok(active.update(&self.conn).await?)
    }

    pub async fn set_login_method(
        &self,
        id: i32,
        method: LoginMethod,
    ) -> Result<users::Model, IdentityError> {
        let user = self.require_by_id(id).await?;

        let mut active: users::ActiveModel = user.into();
        active.login_method = Set(method);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(active.update(&self.conn).await?)
    }

    pub async fn touch_last_login(&self, id: i32) -> Result<users::Model, IdentityError> {
        let user = self.require_by_id(id).await?;
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.last_login = Set(Some(now.clone()));
        active.updated_at = Set(now);

        Ok(active.update(&self.conn).await?)
    }

    pub async fn set_active(&self, id: i32, is_active: bool) -> Result<users::Model, IdentityError> {
        self.update(
            id,
            UserPatch {
                is_active: Some(is_active),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn list_all(&self) -> Result<Vec<users::Model>, IdentityError> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await?)
    }

    /// Explicit deletion; returns whether a row was removed.
    pub async fn remove(&self, id: i32) -> Result<bool, IdentityError> {
        let result = users::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
        assert_eq!(normalize_email("plain@host"), "plain@host");
    }
}
