use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

/// Outbound notification side effects (email/webhook/log). Senders are
/// best-effort collaborators; callers decide whether a failure matters.
#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn welcome_registered(&self, email: &str, name: &str) -> Result<()>;

    async fn reset_code_issued(&self, email: &str, code: &str) -> Result<()>;

    async fn payout_processed(
        &self,
        email: &str,
        name: &str,
        amount_minor: i64,
        transaction_ref: &str,
    ) -> Result<()>;
}
