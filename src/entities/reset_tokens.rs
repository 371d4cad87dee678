use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reset_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// 64-char hex from 32 random bytes. Unguessable, unique.
    #[sea_orm(unique)]
    pub token: String,

    pub user_id: i32,

    /// RFC3339 UTC. Redemption after this instant fails.
    pub expires_at: String,

    /// Transitions false -> true exactly once, under a compare-and-set.
    pub consumed: bool,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
