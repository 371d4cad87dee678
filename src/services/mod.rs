pub mod credential_service;
pub mod credential_service_impl;
pub mod hasher;
pub mod matcher;
pub mod notifier;
pub mod reset_service;
pub mod reset_service_impl;

pub use credential_service::{CredentialService, UserAccount, validate_password_policy};
pub use credential_service_impl::SeaOrmCredentialService;
pub use matcher::{DescriptorMatcher, EuclideanMatcher};
pub use notifier::{LogNotifier, ResetNotifier};
pub use reset_service::ResetService;
pub use reset_service_impl::SeaOrmResetService;
