use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
    entities::{commissions::InsertCommissionEntity, payments::PaymentEntity},
    repositories::{commissions::CommissionRepository, users::UserRepository},
    value_objects::{
        checkout::{CommissionModel, OrderSplitModel},
        enums::commission_statuses::CommissionStatus,
        iam::UserEarningsModel,
    },
};

#[derive(Debug, Error)]
pub enum CommissionError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CommissionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub type CommissionResult<T> = std::result::Result<T, CommissionError>;

/// The single commission-crediting entry point. Both the gateway capture flow
/// and the legacy capture flow accrue through here with one rate table.
pub struct CommissionEngine<C, U>
where
    C: CommissionRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    commission_repo: Arc<C>,
    user_repo: Arc<U>,
    affiliate_rate_bps: i64,
    platform_fee_bps: i64,
}

impl<C, U> CommissionEngine<C, U>
where
    C: CommissionRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn new(
        commission_repo: Arc<C>,
        user_repo: Arc<U>,
        affiliate_rate_bps: i64,
        platform_fee_bps: i64,
    ) -> Self {
        Self {
            commission_repo,
            user_repo,
            affiliate_rate_bps,
            platform_fee_bps,
        }
    }

    pub fn split(&self, amount_minor: i64) -> OrderSplitModel {
        OrderSplitModel::compute(amount_minor, self.affiliate_rate_bps, self.platform_fee_bps)
    }

    /// Credits the affiliate for a first-time completed payment. Callers must
    /// only invoke this once per payment; the capture flip guarantees that.
    /// Unattributed payments accrue nothing.
    pub async fn accrue(&self, payment: &PaymentEntity) -> CommissionResult<Option<CommissionModel>> {
        let affiliate_id = match payment.user_id {
            Some(affiliate_id) => affiliate_id,
            None => {
                info!(
                    payment_id = payment.id,
                    order_id = %payment.order_id,
                    "commission engine: no attribution, nothing accrued"
                );
                return Ok(None);
            }
        };

        let split = self.split(payment.amount_minor);

        info!(
            payment_id = payment.id,
            order_id = %payment.order_id,
            %affiliate_id,
            amount_minor = payment.amount_minor,
            commission_minor = split.affiliate_minor,
            platform_fee_minor = split.platform_fee_minor,
            "commission engine: accruing commission"
        );

        let commission = self
            .commission_repo
            .accrue(InsertCommissionEntity {
                user_id: affiliate_id,
                payment_id: payment.id,
                amount_minor: split.affiliate_minor,
                status: CommissionStatus::Pending.to_string(),
                recurring: false,
                created_at: Utc::now(),
            })
            .await
            .map_err(|err| {
                error!(
                    payment_id = payment.id,
                    %affiliate_id,
                    db_error = ?err,
                    "commission engine: failed to accrue commission"
                );
                CommissionError::Internal(err)
            })?;

        Ok(Some(CommissionModel::from(commission)))
    }

    pub async fn find_for_payment(
        &self,
        payment_id: i64,
    ) -> CommissionResult<Option<CommissionModel>> {
        let commission = self
            .commission_repo
            .find_by_payment(payment_id)
            .await
            .map_err(|err| {
                error!(
                    payment_id,
                    db_error = ?err,
                    "commission engine: failed to load commission for payment"
                );
                CommissionError::Internal(err)
            })?;

        Ok(commission.map(CommissionModel::from))
    }

    pub async fn earnings(&self, user_id: Uuid) -> CommissionResult<UserEarningsModel> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(CommissionError::Internal)?
            .ok_or_else(|| CommissionError::Internal(anyhow::anyhow!("user not found")))?;

        let commissions = self
            .commission_repo
            .list_for_user(user_id, None, 20)
            .await
            .map_err(CommissionError::Internal)?;

        Ok(UserEarningsModel {
            balance_minor: user.commission_balance_minor,
            commissions: commissions.into_iter().map(CommissionModel::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::commissions::CommissionEntity,
        repositories::{commissions::MockCommissionRepository, users::MockUserRepository},
    };

    fn payment(amount_minor: i64, affiliate: Option<Uuid>) -> PaymentEntity {
        PaymentEntity {
            id: 42,
            order_id: "ORDER-1".to_string(),
            user_id: affiliate,
            product_id: Some(7),
            kind: "sale".to_string(),
            amount_minor,
            currency: "USD".to_string(),
            status: "completed".to_string(),
            payer_ref: None,
            capture_ref: None,
            error: None,
            captured_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn engine(
        commission_repo: MockCommissionRepository,
    ) -> CommissionEngine<MockCommissionRepository, MockUserRepository> {
        CommissionEngine::new(
            Arc::new(commission_repo),
            Arc::new(MockUserRepository::new()),
            1_500,
            500,
        )
    }

    #[tokio::test]
    async fn unattributed_payment_accrues_nothing() {
        let mut commission_repo = MockCommissionRepository::new();
        commission_repo.expect_accrue().never();

        let engine = engine(commission_repo);
        let accrued = engine.accrue(&payment(10_000, None)).await.unwrap();
        assert!(accrued.is_none());
    }

    #[tokio::test]
    async fn hundred_dollar_sale_accrues_fifteen_dollars() {
        let affiliate = Uuid::new_v4();

        let mut commission_repo = MockCommissionRepository::new();
        commission_repo
            .expect_accrue()
            .withf(move |insert| {
                insert.user_id == affiliate
                    && insert.payment_id == 42
                    && insert.amount_minor == 1_500
                    && insert.status == "pending"
                    && !insert.recurring
            })
            .times(1)
            .returning(|insert| {
                Ok(CommissionEntity {
                    id: 1,
                    user_id: insert.user_id,
                    payment_id: insert.payment_id,
                    amount_minor: insert.amount_minor,
                    status: insert.status,
                    recurring: insert.recurring,
                    paid_at: None,
                    created_at: insert.created_at,
                })
            });

        let engine = engine(commission_repo);
        let accrued = engine
            .accrue(&payment(10_000, Some(affiliate)))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(accrued.amount_minor, 1_500);
        assert_eq!(accrued.status, "pending");
    }

    #[test]
    fn platform_fee_is_five_percent() {
        let engine = engine(MockCommissionRepository::new());
        let split = engine.split(10_000);
        assert_eq!(split.platform_fee_minor, 500);
        assert_eq!(split.merchant_minor, 8_000);
    }
}
