use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{commissions::CommissionEntity, payments::PaymentEntity},
    value_objects::money,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderModel {
    pub product_id: i64,
    pub affiliate_id: Option<Uuid>,
}

/// Three-way split of a sale amount. Computed upfront for display/audit and
/// recomputed from the captured amount when commissions are credited.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct OrderSplitModel {
    pub total_minor: i64,
    pub affiliate_minor: i64,
    pub platform_fee_minor: i64,
    pub merchant_minor: i64,
}

impl OrderSplitModel {
    pub fn compute(total_minor: i64, affiliate_rate_bps: i64, platform_fee_bps: i64) -> Self {
        let affiliate_minor = money::apply_rate_bps(total_minor, affiliate_rate_bps);
        let platform_fee_minor = money::apply_rate_bps(total_minor, platform_fee_bps);
        Self {
            total_minor,
            affiliate_minor,
            platform_fee_minor,
            merchant_minor: total_minor - affiliate_minor - platform_fee_minor,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedOrderModel {
    pub order_id: String,
    pub approve_url: Option<String>,
    pub split: OrderSplitModel,
}

/// Legacy capture payload carrying externally-supplied payment identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyCaptureModel {
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(rename = "payerID")]
    pub payer_id: String,
    #[serde(rename = "paymentID")]
    pub payment_id: String,
    pub amount: String,
    #[serde(rename = "productId")]
    pub product_id: i64,
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentModel {
    pub id: i64,
    pub order_id: String,
    pub user_id: Option<Uuid>,
    pub product_id: Option<i64>,
    pub kind: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
}

impl From<PaymentEntity> for PaymentModel {
    fn from(entity: PaymentEntity) -> Self {
        Self {
            id: entity.id,
            order_id: entity.order_id,
            user_id: entity.user_id,
            product_id: entity.product_id,
            kind: entity.kind,
            amount_minor: entity.amount_minor,
            currency: entity.currency,
            status: entity.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommissionModel {
    pub id: i64,
    pub user_id: Uuid,
    pub payment_id: i64,
    pub amount_minor: i64,
    pub status: String,
    pub recurring: bool,
}

impl From<CommissionEntity> for CommissionModel {
    fn from(entity: CommissionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            payment_id: entity.payment_id,
            amount_minor: entity.amount_minor,
            status: entity.status,
            recurring: entity.recurring,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureResultModel {
    pub success: bool,
    pub already_processed: bool,
    pub payment: PaymentModel,
    pub commission: Option<CommissionModel>,
}

/// Outcome of the conditional update that flips a payment to completed.
#[derive(Debug, Clone)]
pub enum CaptureFlip {
    Completed(PaymentEntity),
    AlreadyCompleted(PaymentEntity),
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_conserves_the_total() {
        let split = OrderSplitModel::compute(10_000, 1_500, 500);
        assert_eq!(split.affiliate_minor, 1_500);
        assert_eq!(split.platform_fee_minor, 500);
        assert_eq!(split.merchant_minor, 8_000);
        assert_eq!(
            split.affiliate_minor + split.platform_fee_minor + split.merchant_minor,
            split.total_minor
        );
    }

    #[test]
    fn split_conserves_after_rounding() {
        // 10.05: affiliate 1.51 (rounded up), fee 0.50, remainder absorbs the cent
        let split = OrderSplitModel::compute(1_005, 1_500, 500);
        assert_eq!(split.affiliate_minor, 151);
        assert_eq!(split.platform_fee_minor, 50);
        assert_eq!(split.merchant_minor, 804);
        assert_eq!(
            split.affiliate_minor + split.platform_fee_minor + split.merchant_minor,
            split.total_minor
        );
    }
}
