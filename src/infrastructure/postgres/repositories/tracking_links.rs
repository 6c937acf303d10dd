use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    RunQueryDsl, insert_into, prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use std::sync::Arc;

use crate::{
    domain::{
        entities::tracking_links::{InsertTrackingLinkEntity, TrackingLinkEntity},
        repositories::tracking_links::TrackingLinkRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::tracking_links},
};

pub struct TrackingLinkPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TrackingLinkPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl TrackingLinkRepository for TrackingLinkPostgres {
    async fn create(&self, link: InsertTrackingLinkEntity) -> Result<Option<TrackingLinkEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(tracking_links::table)
            .values(&link)
            .returning(TrackingLinkEntity::as_returning())
            .get_result::<TrackingLinkEntity>(&mut conn);

        match result {
            Ok(entity) => Ok(Some(entity)),
            // Slug uniqueness is a database constraint; collisions surface
            // here and the caller retries with a fresh slug.
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TrackingLinkEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = tracking_links::table
            .filter(tracking_links::slug.eq(slug))
            .select(TrackingLinkEntity::as_select())
            .first::<TrackingLinkEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
