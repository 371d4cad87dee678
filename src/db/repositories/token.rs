use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::reset_tokens;
use crate::errors::IdentityError;

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        user_id: i32,
        token: &str,
        expires_at: &str,
    ) -> Result<reset_tokens::Model, IdentityError> {
        use sea_orm::ActiveModelTrait;

        let active = reset_tokens::ActiveModel {
            token: Set(token.to_string()),
            user_id: Set(user_id),
            expires_at: Set(expires_at.to_string()),
            consumed: Set(false),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        Ok(active.insert(&self.conn).await?)
    }

    pub async fn find(&self, token: &str) -> Result<Option<reset_tokens::Model>, IdentityError> {
        Ok(reset_tokens::Entity::find()
            .filter(reset_tokens::Column::Token.eq(token))
            .one(&self.conn)
            .await?)
    }

    /// Most recently issued token for a user, consumed or not. Used by
    /// administrative tooling; redemption always goes through the token
    /// value itself.
    pub async fn latest_for_user(
        &self,
        user_id: i32,
    ) -> Result<Option<reset_tokens::Model>, IdentityError> {
        Ok(reset_tokens::Entity::find()
            .filter(reset_tokens::Column::UserId.eq(user_id))
            .order_by_desc(reset_tokens::Column::Id)
            .one(&self.conn)
            .await?)
    }

    /// Removes a user's consumed and expired tokens. Redemption checks
    /// expiry independently, so rows this sweep has not reached yet are
    /// inert; the sweep only keeps the table small.
    pub async fn purge_stale_for_user(
        &self,
        user_id: i32,
        now: &str,
    ) -> Result<u64, IdentityError> {
        let result = reset_tokens::Entity::delete_many()
            .filter(reset_tokens::Column::UserId.eq(user_id))
            .filter(
                Condition::any()
                    .add(reset_tokens::Column::Consumed.eq(true))
                    .add(reset_tokens::Column::ExpiresAt.lt(now)),
            )
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Consumes the token and applies the new password hash as one unit.
    ///
    /// The consume is a compare-and-set: an UPDATE filtered on
    /// `consumed = false` whose affected-row count decides the outcome, so
    /// two concurrent redeems of the same token cannot both pass. It is also
    /// the first statement in the transaction, so the write lock is taken up
    /// front and SQLite never has to upgrade a read snapshot mid-transaction.
    pub async fn consume_and_set_password(
        &self,
        token: &str,
        user_id: i32,
        new_hash: &str,
    ) -> Result<(), IdentityError> {
        use crate::entities::users;

        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let consumed = reset_tokens::Entity::update_many()
            .col_expr(reset_tokens::Column::Consumed, Expr::value(true))
            .filter(reset_tokens::Column::Token.eq(token))
            .filter(reset_tokens::Column::Consumed.eq(false))
            .exec(&txn)
            .await?;

        if consumed.rows_affected != 1 {
            txn.rollback().await?;
            return Err(IdentityError::InvalidToken);
        }

        let applied = users::Entity::update_many()
            .col_expr(
                users::Column::PasswordHash,
                Expr::value(Some(new_hash.to_string())),
            )
            .col_expr(users::Column::LoginMethod, Expr::value("password"))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;

        if applied.rows_affected != 1 {
            txn.rollback().await?;
            return Err(IdentityError::NotFound);
        }

        txn.commit().await?;
        Ok(())
    }
}
