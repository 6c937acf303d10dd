use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::clicks;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = clicks)]
pub struct ClickEntity {
    pub id: i64,
    pub click_id: Uuid,
    pub link_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = clicks)]
pub struct InsertClickEntity {
    pub click_id: Uuid,
    pub link_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
