use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::commissions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = commissions)]
pub struct CommissionEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub payment_id: i64,
    pub amount_minor: i64,
    pub status: String,
    pub recurring: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = commissions)]
pub struct InsertCommissionEntity {
    pub user_id: Uuid,
    pub payment_id: i64,
    pub amount_minor: i64,
    pub status: String,
    pub recurring: bool,
    pub created_at: DateTime<Utc>,
}
