pub mod prelude;

pub mod reset_tokens;
pub mod users;
