use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::settlement::SettledBatch;

#[automock]
#[async_trait]
pub trait SettlementRepository {
    /// One atomic transaction per affiliate: marks pending commissions paid,
    /// zeroes the cached balance, and writes a payout ledger row under
    /// `transaction_ref`. Returns a zero-total batch when a concurrent run
    /// already settled this affiliate.
    async fn settle_affiliate(&self, user_id: Uuid, transaction_ref: &str)
        -> Result<SettledBatch>;
}
