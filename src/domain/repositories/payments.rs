use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity},
    value_objects::checkout::CaptureFlip,
};

#[automock]
#[async_trait]
pub trait PaymentRepository {
    async fn create_pending(&self, payment: InsertPaymentEntity) -> Result<PaymentEntity>;

    /// Inserts a pending row unless one already exists for the order id.
    /// Used by the legacy capture path, where the order id arrives from
    /// outside instead of from our own create-order step.
    async fn create_pending_if_absent(&self, payment: InsertPaymentEntity) -> Result<()>;

    /// Single-statement conditional update: flips the payment for `order_id`
    /// to completed with the captured amount unless it is already completed.
    /// This is the idempotency gate for commission crediting and must stay
    /// correct across multiple server processes.
    async fn complete_if_not_completed(
        &self,
        order_id: &str,
        captured_amount_minor: i64,
        capture_ref: Option<String>,
        attributed_affiliate: Option<Uuid>,
    ) -> Result<CaptureFlip>;

    async fn mark_failed(&self, order_id: &str, error: &str) -> Result<()>;

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<PaymentEntity>>;
}
