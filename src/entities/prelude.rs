pub use super::reset_tokens::Entity as ResetTokens;
pub use super::users::Entity as Users;
