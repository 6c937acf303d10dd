use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::clicks::InsertClickEntity, value_objects::tracking::ClickAttribution,
};

#[automock]
#[async_trait]
pub trait ClickRepository {
    /// Appends a click record. The ledger is append-only; rows are never
    /// mutated or deleted.
    async fn record(&self, click: InsertClickEntity) -> Result<Uuid>;

    async fn find_attribution(&self, click_id: Uuid) -> Result<Option<ClickAttribution>>;
}
