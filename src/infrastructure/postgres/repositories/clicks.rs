use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::clicks::InsertClickEntity, repositories::clicks::ClickRepository,
        value_objects::tracking::ClickAttribution,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{clicks, tracking_links},
    },
};

pub struct ClickPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ClickPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ClickRepository for ClickPostgres {
    async fn record(&self, click: InsertClickEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let click_id = insert_into(clicks::table)
            .values(&click)
            .returning(clicks::click_id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(click_id)
    }

    async fn find_attribution(&self, click_id: Uuid) -> Result<Option<ClickAttribution>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = clicks::table
            .inner_join(tracking_links::table)
            .filter(clicks::click_id.eq(click_id))
            .select((
                tracking_links::id,
                tracking_links::user_id,
                tracking_links::product_id,
            ))
            .first::<(i64, Uuid, i64)>(&mut conn)
            .optional()?;

        Ok(result.map(|(link_id, affiliate_id, product_id)| ClickAttribution {
            link_id,
            affiliate_id,
            product_id,
        }))
    }
}
