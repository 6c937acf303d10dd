use std::fmt::Display;

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Processed,
    Skipped,
    Failed,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Processed => "processed",
            SettlementStatus::Skipped => "skipped",
            SettlementStatus::Failed => "failed",
        }
    }
}

impl Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-affiliate outcome of one settlement run.
#[derive(Debug, Clone, Serialize)]
pub struct PayoutResultModel {
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub status: SettlementStatus,
    pub transaction_ref: Option<String>,
    pub detail: Option<String>,
}

/// What one per-affiliate settlement transaction actually changed.
#[derive(Debug, Clone)]
pub struct SettledBatch {
    pub payout_payment_id: Option<i64>,
    pub commission_count: i64,
    pub total_minor: i64,
}
