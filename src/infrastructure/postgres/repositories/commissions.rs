use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{Connection, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::commissions::{CommissionEntity, InsertCommissionEntity},
        repositories::commissions::CommissionRepository,
        value_objects::enums::commission_statuses::CommissionStatus,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{commissions, users},
    },
};

pub struct CommissionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CommissionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CommissionRepository for CommissionPostgres {
    async fn accrue(&self, commission: InsertCommissionEntity) -> Result<CommissionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Row insert and cached-balance credit commit together or not at all;
        // that keeps pending-sum == balance under concurrent captures.
        let result = conn.transaction::<CommissionEntity, anyhow::Error, _>(|conn| {
            let inserted = insert_into(commissions::table)
                .values(&commission)
                .returning(CommissionEntity::as_returning())
                .get_result::<CommissionEntity>(conn)?;

            let credited = update(users::table)
                .filter(users::id.eq(inserted.user_id))
                .set((
                    users::commission_balance_minor
                        .eq(users::commission_balance_minor + inserted.amount_minor),
                    users::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            if credited == 0 {
                anyhow::bail!("affiliate {} not found for balance credit", inserted.user_id);
            }

            Ok(inserted)
        })?;

        Ok(result)
    }

    async fn find_by_payment(&self, payment_id: i64) -> Result<Option<CommissionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = commissions::table
            .filter(commissions::payment_id.eq(payment_id))
            .select(CommissionEntity::as_select())
            .first::<CommissionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<CommissionStatus>,
        limit: i64,
    ) -> Result<Vec<CommissionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = commissions::table
            .filter(commissions::user_id.eq(user_id))
            .select(CommissionEntity::as_select())
            .into_boxed();

        if let Some(status) = status {
            query = query.filter(commissions::status.eq(status.as_str()));
        }

        let results = query
            .order(commissions::created_at.desc())
            .limit(limit)
            .load::<CommissionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn pending_total_for_user(&self, user_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let amounts = commissions::table
            .filter(commissions::user_id.eq(user_id))
            .filter(commissions::status.eq(CommissionStatus::Pending.as_str()))
            .select(commissions::amount_minor)
            .load::<i64>(&mut conn)?;

        Ok(amounts.iter().sum())
    }
}
