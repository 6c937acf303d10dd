use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::commissions::{CommissionEntity, InsertCommissionEntity},
    value_objects::enums::commission_statuses::CommissionStatus,
};

#[automock]
#[async_trait]
pub trait CommissionRepository {
    /// Inserts the commission row and credits the affiliate's cached balance
    /// in one store transaction (both-or-neither).
    async fn accrue(&self, commission: InsertCommissionEntity) -> Result<CommissionEntity>;

    async fn find_by_payment(&self, payment_id: i64) -> Result<Option<CommissionEntity>>;

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<CommissionStatus>,
        limit: i64,
    ) -> Result<Vec<CommissionEntity>>;

    async fn pending_total_for_user(&self, user_id: Uuid) -> Result<i64>;
}
