//! Seam for the email/notification collaborator.
//!
//! Delivery is fire-and-forget: the reset service spawns the call and logs a
//! failure, because a delivery fault must never change `issue()`'s observable
//! outcome.

use async_trait::async_trait;
use tracing::{debug, info};

#[async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn deliver(&self, email: &str, token: &str) -> anyhow::Result<()>;
}

/// Log-only stand-in for a real mail transport. The token value only appears
/// at debug level.
pub struct LogNotifier;

#[async_trait]
impl ResetNotifier for LogNotifier {
    async fn deliver(&self, email: &str, token: &str) -> anyhow::Result<()> {
        info!(email, "password reset notification queued");
        debug!(email, token, "reset token (log transport)");
        Ok(())
    }
}
