use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infrastructure::postgres::schema::password_reset_codes;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = password_reset_codes)]
pub struct PasswordResetCodeEntity {
    pub id: i64,
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = password_reset_codes)]
pub struct InsertPasswordResetCodeEntity {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}
