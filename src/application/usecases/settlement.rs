use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::notifier::Notifier;
use crate::domain::{
    entities::users::UserEntity,
    repositories::{settlements::SettlementRepository, users::UserRepository},
    value_objects::settlement::{PayoutResultModel, SettlementStatus},
};

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SettlementError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub type SettlementResult<T> = std::result::Result<T, SettlementError>;

pub struct SettlementUseCase<U, S, N>
where
    U: UserRepository + Send + Sync,
    S: SettlementRepository + Send + Sync,
    N: Notifier,
{
    user_repo: Arc<U>,
    settlement_repo: Arc<S>,
    notifier: Arc<N>,
    payout_min_minor: i64,
}

impl<U, S, N> SettlementUseCase<U, S, N>
where
    U: UserRepository + Send + Sync,
    S: SettlementRepository + Send + Sync,
    N: Notifier,
{
    pub fn new(
        user_repo: Arc<U>,
        settlement_repo: Arc<S>,
        notifier: Arc<N>,
        payout_min_minor: i64,
    ) -> Self {
        Self {
            user_repo,
            settlement_repo,
            notifier,
            payout_min_minor,
        }
    }

    /// Settles every eligible affiliate independently. One affiliate's
    /// failure is collected into its result, never propagated to the others.
    pub async fn settle_pending(&self) -> SettlementResult<Vec<PayoutResultModel>> {
        let candidates = self.user_repo.list_settlement_candidates().await.map_err(|err| {
            error!(db_error = ?err, "settlement: failed to list candidates");
            SettlementError::Internal(err)
        })?;

        info!(
            candidate_count = candidates.len(),
            "settlement: run started"
        );

        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            results.push(self.settle_one(&candidate).await);
        }

        let processed = results
            .iter()
            .filter(|r| r.status == SettlementStatus::Processed)
            .count();
        info!(
            processed,
            total = results.len(),
            "settlement: run finished"
        );

        Ok(results)
    }

    async fn settle_one(&self, candidate: &UserEntity) -> PayoutResultModel {
        let user_id = candidate.id;
        let balance = candidate.commission_balance_minor;

        if balance < self.payout_min_minor {
            info!(%user_id, balance_minor = balance, "settlement: below minimum, skipped");
            return PayoutResultModel {
                user_id,
                amount_minor: balance,
                status: SettlementStatus::Skipped,
                transaction_ref: None,
                detail: Some("balance below minimum payout".to_string()),
            };
        }

        let payout_email = match candidate.payout_email.as_deref() {
            Some(email) if !email.is_empty() => email.to_string(),
            _ => {
                info!(%user_id, "settlement: no payout destination, skipped");
                return PayoutResultModel {
                    user_id,
                    amount_minor: balance,
                    status: SettlementStatus::Skipped,
                    transaction_ref: None,
                    detail: Some("no payout destination configured".to_string()),
                };
            }
        };

        let transaction_ref = generate_transaction_ref(user_id);
        let batch = match self
            .settlement_repo
            .settle_affiliate(user_id, &transaction_ref)
            .await
        {
            Ok(batch) => batch,
            Err(err) => {
                error!(%user_id, db_error = ?err, "settlement: affiliate settlement failed");
                return PayoutResultModel {
                    user_id,
                    amount_minor: balance,
                    status: SettlementStatus::Failed,
                    transaction_ref: None,
                    detail: Some(err.to_string()),
                };
            }
        };

        // A concurrent run got here first; its transaction already moved the
        // money, so this run only reports a skip.
        if batch.total_minor == 0 {
            info!(%user_id, "settlement: already settled by another run");
            return PayoutResultModel {
                user_id,
                amount_minor: 0,
                status: SettlementStatus::Skipped,
                transaction_ref: None,
                detail: Some("nothing pending to settle".to_string()),
            };
        }

        info!(
            %user_id,
            total_minor = batch.total_minor,
            commission_count = batch.commission_count,
            transaction_ref = %transaction_ref,
            "settlement: affiliate settled"
        );

        let mut detail = None;
        if let Err(err) = self
            .notifier
            .payout_processed(&payout_email, &candidate.name, batch.total_minor, &transaction_ref)
            .await
        {
            // The payout is already committed; a notification failure is
            // reported but never unwinds it.
            warn!(%user_id, error = ?err, "settlement: payout notification failed");
            detail = Some(format!("notification failed: {}", err));
        }

        PayoutResultModel {
            user_id,
            amount_minor: batch.total_minor,
            status: SettlementStatus::Processed,
            transaction_ref: Some(transaction_ref),
            detail,
        }
    }
}

fn generate_transaction_ref(user_id: Uuid) -> String {
    format!("PO-{}-{}", user_id.simple(), Uuid::new_v4().simple())
}

/// Interval-driven settlement runner. The admin trigger stays available; this
/// just keeps payouts moving without one.
pub async fn run_settlement_loop<U, S, N>(
    usecase: Arc<SettlementUseCase<U, S, N>>,
    interval: Duration,
) where
    U: UserRepository + Send + Sync,
    S: SettlementRepository + Send + Sync,
    N: Notifier,
{
    loop {
        tokio::time::sleep(interval).await;

        match usecase.settle_pending().await {
            Ok(results) => {
                let failed = results
                    .iter()
                    .filter(|r| r.status == SettlementStatus::Failed)
                    .count();
                if failed > 0 {
                    warn!(failed, "settlement loop: run completed with failures");
                }
            }
            Err(err) => error!(error = ?err, "settlement loop: run failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notifier::MockNotifier;
    use crate::domain::{
        repositories::{settlements::MockSettlementRepository, users::MockUserRepository},
        value_objects::settlement::SettledBatch,
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    fn affiliate(balance_minor: i64, payout_email: Option<&str>) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.test".to_string(),
            password_hash: "hash".to_string(),
            role: "affiliate".to_string(),
            payout_email: payout_email.map(|e| e.to_string()),
            commission_balance_minor: balance_minor,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn usecase(
        users: MockUserRepository,
        settlements: MockSettlementRepository,
        notifier: MockNotifier,
    ) -> SettlementUseCase<MockUserRepository, MockSettlementRepository, MockNotifier> {
        SettlementUseCase::new(
            Arc::new(users),
            Arc::new(settlements),
            Arc::new(notifier),
            100,
        )
    }

    #[tokio::test]
    async fn balance_below_threshold_is_skipped_untouched() {
        let mut users = MockUserRepository::new();
        users
            .expect_list_settlement_candidates()
            .returning(|| Ok(vec![affiliate(50, Some("ada@pay.test"))]));

        let mut settlements = MockSettlementRepository::new();
        settlements.expect_settle_affiliate().never();

        let mut notifier = MockNotifier::new();
        notifier.expect_payout_processed().never();

        let results = usecase(users, settlements, notifier)
            .settle_pending()
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, SettlementStatus::Skipped);
        assert_eq!(results[0].amount_minor, 50);
        assert!(results[0].transaction_ref.is_none());
    }

    #[tokio::test]
    async fn missing_payout_destination_is_skipped() {
        let mut users = MockUserRepository::new();
        users
            .expect_list_settlement_candidates()
            .returning(|| Ok(vec![affiliate(1_500, None)]));

        let mut settlements = MockSettlementRepository::new();
        settlements.expect_settle_affiliate().never();

        let results = usecase(users, settlements, MockNotifier::new())
            .settle_pending()
            .await
            .unwrap();

        assert_eq!(results[0].status, SettlementStatus::Skipped);
    }

    #[tokio::test]
    async fn settles_and_notifies_eligible_affiliate() {
        let ada = affiliate(1_500, Some("ada@pay.test"));
        let ada_id = ada.id;

        let mut users = MockUserRepository::new();
        users
            .expect_list_settlement_candidates()
            .returning(move || Ok(vec![ada.clone()]));

        let mut settlements = MockSettlementRepository::new();
        settlements
            .expect_settle_affiliate()
            .with(eq(ada_id), mockall::predicate::always())
            .times(1)
            .returning(|_, _| {
                Ok(SettledBatch {
                    payout_payment_id: Some(77),
                    commission_count: 3,
                    total_minor: 1_500,
                })
            });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_payout_processed()
            .withf(|email, _, amount, _| email == "ada@pay.test" && *amount == 1_500)
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let results = usecase(users, settlements, notifier)
            .settle_pending()
            .await
            .unwrap();

        assert_eq!(results[0].status, SettlementStatus::Processed);
        assert_eq!(results[0].amount_minor, 1_500);
        assert!(results[0].transaction_ref.is_some());
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_rest() {
        let failing = affiliate(1_000, Some("fail@pay.test"));
        let healthy = affiliate(2_000, Some("ok@pay.test"));
        let failing_id = failing.id;

        let mut users = MockUserRepository::new();
        users
            .expect_list_settlement_candidates()
            .returning(move || Ok(vec![failing.clone(), healthy.clone()]));

        let mut settlements = MockSettlementRepository::new();
        settlements
            .expect_settle_affiliate()
            .times(2)
            .returning(move |user_id, _| {
                if user_id == failing_id {
                    Err(anyhow::anyhow!("deadlock detected"))
                } else {
                    Ok(SettledBatch {
                        payout_payment_id: Some(78),
                        commission_count: 1,
                        total_minor: 2_000,
                    })
                }
            });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_payout_processed()
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let results = usecase(users, settlements, notifier)
            .settle_pending()
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, SettlementStatus::Failed);
        assert_eq!(results[1].status, SettlementStatus::Processed);
    }

    #[tokio::test]
    async fn notification_failure_keeps_the_payout_processed() {
        let ada = affiliate(1_500, Some("ada@pay.test"));

        let mut users = MockUserRepository::new();
        users
            .expect_list_settlement_candidates()
            .returning(move || Ok(vec![ada.clone()]));

        let mut settlements = MockSettlementRepository::new();
        settlements.expect_settle_affiliate().returning(|_, _| {
            Ok(SettledBatch {
                payout_payment_id: Some(79),
                commission_count: 2,
                total_minor: 1_500,
            })
        });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_payout_processed()
            .returning(|_, _, _, _| Err(anyhow::anyhow!("smtp unreachable")));

        let results = usecase(users, settlements, notifier)
            .settle_pending()
            .await
            .unwrap();

        assert_eq!(results[0].status, SettlementStatus::Processed);
        assert!(results[0].detail.as_deref().unwrap().contains("notification failed"));
    }

    #[tokio::test]
    async fn concurrent_run_reports_skip_for_already_settled() {
        let ada = affiliate(1_500, Some("ada@pay.test"));

        let mut users = MockUserRepository::new();
        users
            .expect_list_settlement_candidates()
            .returning(move || Ok(vec![ada.clone()]));

        let mut settlements = MockSettlementRepository::new();
        settlements.expect_settle_affiliate().returning(|_, _| {
            Ok(SettledBatch {
                payout_payment_id: None,
                commission_count: 0,
                total_minor: 0,
            })
        });

        let mut notifier = MockNotifier::new();
        notifier.expect_payout_processed().never();

        let results = usecase(users, settlements, notifier)
            .settle_pending()
            .await
            .unwrap();

        assert_eq!(results[0].status, SettlementStatus::Skipped);
    }
}
