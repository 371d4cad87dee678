use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stored normalized (trimmed, ASCII-lowercased); the external lookup key.
    #[sea_orm(unique)]
    pub email: String,

    /// Absent on legacy rows.
    pub display_name: Option<String>,

    pub role: Role,

    pub is_active: bool,

    /// RFC3339 UTC. Non-null and non-sentinel after the repair migration.
    pub created_at: String,

    pub updated_at: String,

    /// Set only on successful authentication.
    pub last_login: Option<String>,

    /// Which credential path is authoritative for this user.
    pub login_method: LoginMethod,

    /// Argon2id PHC string. Retained when the user switches to facial login.
    pub password_hash: Option<String>,

    /// JSON-encoded fixed-length descriptor vector.
    pub facial_descriptor: Option<String>,

    pub facial_registered_at: Option<String>,

    /// Free-form capture context (device, lighting, ...).
    pub facial_metadata: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "standard")]
    Standard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum LoginMethod {
    #[sea_orm(string_value = "password")]
    Password,
    #[sea_orm(string_value = "facial")]
    Facial,
}

impl Role {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "standard" => Some(Self::Standard),
            _ => None,
        }
    }
}

impl LoginMethod {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "password" => Some(Self::Password),
            "facial" => Some(Self::Facial),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
