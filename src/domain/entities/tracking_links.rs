use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::tracking_links;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = tracking_links)]
pub struct TrackingLinkEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub product_id: i64,
    pub slug: String,
    pub destination_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tracking_links)]
pub struct InsertTrackingLinkEntity {
    pub user_id: Uuid,
    pub product_id: i64,
    pub slug: String,
    pub destination_url: String,
    pub created_at: DateTime<Utc>,
}
