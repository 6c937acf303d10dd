use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::application::notifier::Notifier;
use crate::domain::value_objects::money;

/// Delivers notifications to a configured webhook; without one it degrades to
/// structured log lines so the side effect is still observable.
pub struct WebhookNotifier {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url,
        }
    }

    async fn deliver(&self, subject: &str, recipient: &str, content: String) -> Result<()> {
        let Some(webhook_url) = self.webhook_url.as_deref() else {
            info!(subject, recipient, content = %content, "notifier: webhook not configured, logged only");
            return Ok(());
        };

        let resp = self
            .http
            .post(webhook_url)
            .json(&json!({
                "subject": subject,
                "recipient": recipient,
                "content": content,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!(
                "notification webhook returned status {} for '{}'",
                resp.status(),
                subject
            );
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn welcome_registered(&self, email: &str, name: &str) -> Result<()> {
        self.deliver(
            "Welcome aboard",
            email,
            format!("Hi {name}, your affiliate account is ready. Submit a product or grab a tracking link to start earning."),
        )
        .await
    }

    async fn reset_code_issued(&self, email: &str, code: &str) -> Result<()> {
        self.deliver(
            "Your recovery code",
            email,
            format!("Your password recovery code is {code}. It expires in 15 minutes."),
        )
        .await
    }

    async fn payout_processed(
        &self,
        email: &str,
        name: &str,
        amount_minor: i64,
        transaction_ref: &str,
    ) -> Result<()> {
        self.deliver(
            "Commission payout processed",
            email,
            format!(
                "Hi {name}, your commission payout of ${} has been processed (transaction {transaction_ref}).",
                money::format_minor(amount_minor)
            ),
        )
        .await
    }
}
