use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::{InsertPaymentEntity, PaymentEntity},
        repositories::payments::PaymentRepository,
        value_objects::{checkout::CaptureFlip, enums::payment_statuses::PaymentStatus},
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payments},
};

use diesel::sql_types::{Nullable, Uuid as SqlUuid};

diesel::define_sql_function! {
    fn coalesce(a: Nullable<SqlUuid>, b: Nullable<SqlUuid>) -> Nullable<SqlUuid>;
}

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn create_pending(&self, payment: InsertPaymentEntity) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(payments::table)
            .values(&payment)
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)?;

        Ok(result)
    }

    async fn create_pending_if_absent(&self, payment: InsertPaymentEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(payments::table)
            .values(&payment)
            .on_conflict(payments::order_id)
            .do_nothing()
            .execute(&mut conn)?;

        Ok(())
    }

    async fn complete_if_not_completed(
        &self,
        order_id: &str,
        captured_amount_minor: i64,
        capture_ref: Option<String>,
        attributed_affiliate: Option<Uuid>,
    ) -> Result<CaptureFlip> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        // One conditional statement, so only a single caller can ever win the
        // flip even across server processes. The attribution only fills a
        // still-empty slot; it never overwrites an earlier one.
        let flipped = update(payments::table)
            .filter(payments::order_id.eq(order_id))
            .filter(payments::status.ne(PaymentStatus::Completed.as_str()))
            .set((
                payments::status.eq(PaymentStatus::Completed.as_str()),
                payments::amount_minor.eq(captured_amount_minor),
                payments::capture_ref.eq(capture_ref),
                payments::user_id.eq(coalesce(payments::user_id, attributed_affiliate)),
                payments::error.eq(None::<String>),
                payments::captured_at.eq(Some(now)),
                payments::updated_at.eq(now),
            ))
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()?;

        if let Some(payment) = flipped {
            return Ok(CaptureFlip::Completed(payment));
        }

        let existing = payments::table
            .filter(payments::order_id.eq(order_id))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(match existing {
            Some(payment) => CaptureFlip::AlreadyCompleted(payment),
            None => CaptureFlip::NotFound,
        })
    }

    async fn mark_failed(&self, order_id: &str, error: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(payments::table)
            .filter(payments::order_id.eq(order_id))
            .filter(payments::status.ne(PaymentStatus::Completed.as_str()))
            .set((
                payments::status.eq(PaymentStatus::Failed.as_str()),
                payments::error.eq(Some(error)),
                payments::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .filter(payments::order_id.eq(order_id))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
