use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::products::{InsertProductEntity, ProductEntity},
    value_objects::{enums::product_statuses::ProductStatus, products::ReviewOutcome},
};

#[automock]
#[async_trait]
pub trait ProductRepository {
    async fn create(&self, product: InsertProductEntity) -> Result<ProductEntity>;

    async fn find_by_id(&self, product_id: i64) -> Result<Option<ProductEntity>>;

    async fn list_by_status(&self, status: ProductStatus) -> Result<Vec<ProductEntity>>;

    /// Transitions a pending product to the given status. The update is
    /// conditional on the row still being pending, so a repeated review is a
    /// no-op that reports the current state.
    async fn review(&self, product_id: i64, status: ProductStatus) -> Result<ReviewOutcome>;
}
