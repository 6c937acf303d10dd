use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{Connection, RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain::{
        entities::password_reset_codes::{
            InsertPasswordResetCodeEntity, PasswordResetCodeEntity,
        },
        repositories::password_resets::PasswordResetRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::password_reset_codes},
};

pub struct PasswordResetPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PasswordResetPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PasswordResetRepository for PasswordResetPostgres {
    async fn issue_code(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<(), anyhow::Error, _>(|conn| {
            delete(password_reset_codes::table)
                .filter(password_reset_codes::email.eq(email))
                .execute(conn)?;

            insert_into(password_reset_codes::table)
                .values(&InsertPasswordResetCodeEntity {
                    email: email.to_string(),
                    code_hash: code_hash.to_string(),
                    expires_at,
                    attempts: 0,
                    created_at: Utc::now(),
                })
                .execute(conn)?;

            Ok(())
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PasswordResetCodeEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = password_reset_codes::table
            .filter(password_reset_codes::email.eq(email))
            .order(password_reset_codes::created_at.desc())
            .select(PasswordResetCodeEntity::as_select())
            .first::<PasswordResetCodeEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn record_attempt(&self, id: i64) -> Result<i32> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let attempts = update(password_reset_codes::table)
            .filter(password_reset_codes::id.eq(id))
            .set(password_reset_codes::attempts.eq(password_reset_codes::attempts + 1))
            .returning(password_reset_codes::attempts)
            .get_result::<i32>(&mut conn)?;

        Ok(attempts)
    }

    async fn mark_verified(&self, id: i64) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(password_reset_codes::table)
            .filter(password_reset_codes::id.eq(id))
            .set(password_reset_codes::verified_at.eq(Some(Utc::now())))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete_for_email(&self, email: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(password_reset_codes::table)
            .filter(password_reset_codes::email.eq(email))
            .execute(&mut conn)?;

        Ok(())
    }
}
