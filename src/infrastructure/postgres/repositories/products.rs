use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain::{
        entities::products::{InsertProductEntity, ProductEntity},
        repositories::products::ProductRepository,
        value_objects::{enums::product_statuses::ProductStatus, products::ReviewOutcome},
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::products},
};

pub struct ProductPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ProductPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProductRepository for ProductPostgres {
    async fn create(&self, product: InsertProductEntity) -> Result<ProductEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(products::table)
            .values(&product)
            .returning(ProductEntity::as_returning())
            .get_result::<ProductEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, product_id: i64) -> Result<Option<ProductEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = products::table
            .find(product_id)
            .select(ProductEntity::as_select())
            .first::<ProductEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_status(&self, status: ProductStatus) -> Result<Vec<ProductEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = products::table
            .filter(products::status.eq(status.as_str()))
            .order(products::created_at.desc())
            .select(ProductEntity::as_select())
            .load::<ProductEntity>(&mut conn)?;

        Ok(results)
    }

    async fn review(&self, product_id: i64, status: ProductStatus) -> Result<ReviewOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Conditional on the row still being pending so the transition can
        // only ever fire once, whatever the callers do.
        let transitioned = update(products::table)
            .filter(products::id.eq(product_id))
            .filter(products::status.eq(ProductStatus::Pending.as_str()))
            .set((
                products::status.eq(status.as_str()),
                products::updated_at.eq(Utc::now()),
            ))
            .returning(ProductEntity::as_returning())
            .get_result::<ProductEntity>(&mut conn)
            .optional()?;

        if let Some(product) = transitioned {
            return Ok(ReviewOutcome::Transitioned(product));
        }

        let current = products::table
            .find(product_id)
            .select(ProductEntity::as_select())
            .first::<ProductEntity>(&mut conn)
            .optional()?;

        Ok(match current {
            Some(product) => ReviewOutcome::Unchanged(product),
            None => ReviewOutcome::NotFound,
        })
    }
}
