use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::entities::password_reset_codes::PasswordResetCodeEntity;

#[automock]
#[async_trait]
pub trait PasswordResetRepository {
    /// Replaces any existing code for the email with a fresh one.
    async fn issue_code(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn find_by_email(&self, email: &str) -> Result<Option<PasswordResetCodeEntity>>;

    /// Increments the attempt counter and returns the new count.
    async fn record_attempt(&self, id: i64) -> Result<i32>;

    async fn mark_verified(&self, id: i64) -> Result<()>;

    async fn delete_for_email(&self, email: &str) -> Result<()>;
}
