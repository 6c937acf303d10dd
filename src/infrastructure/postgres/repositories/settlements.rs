use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{Connection, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::InsertPaymentEntity,
        repositories::settlements::SettlementRepository,
        value_objects::{
            enums::{
                commission_statuses::CommissionStatus, payment_kinds::PaymentKind,
                payment_statuses::PaymentStatus,
            },
            settlement::SettledBatch,
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{commissions, payments, users},
    },
};

pub struct SettlementPostgres {
    db_pool: Arc<PgPoolSquad>,
    currency: String,
}

impl SettlementPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>, currency: String) -> Self {
        Self { db_pool, currency }
    }
}

#[async_trait]
impl SettlementRepository for SettlementPostgres {
    async fn settle_affiliate(
        &self,
        user_id: Uuid,
        transaction_ref: &str,
    ) -> Result<SettledBatch> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let currency = self.currency.clone();

        conn.transaction::<SettledBatch, anyhow::Error, _>(|conn| {
            let now = Utc::now();

            let amounts = update(commissions::table)
                .filter(commissions::user_id.eq(user_id))
                .filter(commissions::status.eq(CommissionStatus::Pending.as_str()))
                .set((
                    commissions::status.eq(CommissionStatus::Paid.as_str()),
                    commissions::paid_at.eq(Some(now)),
                ))
                .returning(commissions::amount_minor)
                .get_results::<i64>(conn)?;

            let total_minor: i64 = amounts.iter().sum();

            // Nothing pending: a concurrent run settled this affiliate first.
            if total_minor == 0 {
                return Ok(SettledBatch {
                    payout_payment_id: None,
                    commission_count: 0,
                    total_minor: 0,
                });
            }

            update(users::table)
                .filter(users::id.eq(user_id))
                .set((
                    users::commission_balance_minor.eq(0),
                    users::updated_at.eq(now),
                ))
                .execute(conn)?;

            let payout_payment_id = insert_into(payments::table)
                .values(&InsertPaymentEntity {
                    order_id: transaction_ref.to_string(),
                    user_id: Some(user_id),
                    product_id: None,
                    kind: PaymentKind::Payout.to_string(),
                    amount_minor: total_minor,
                    currency,
                    status: PaymentStatus::Completed.to_string(),
                    payer_ref: Some("SYSTEM".to_string()),
                    capture_ref: None,
                    error: None,
                    captured_at: Some(now),
                    created_at: now,
                    updated_at: now,
                })
                .returning(payments::id)
                .get_result::<i64>(conn)?;

            Ok(SettledBatch {
                payout_payment_id: Some(payout_payment_id),
                commission_count: amounts.len() as i64,
                total_minor,
            })
        })
    }
}
