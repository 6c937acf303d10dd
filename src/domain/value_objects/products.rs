use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::products::ProductEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitProductModel {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductModel {
    pub id: i64,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub price_minor: i64,
    pub status: String,
}

impl From<ProductEntity> for ProductModel {
    fn from(entity: ProductEntity) -> Self {
        Self {
            id: entity.id,
            owner_id: entity.owner_id,
            title: entity.title,
            description: entity.description,
            category: entity.category,
            price_minor: entity.price_minor,
            status: entity.status,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

/// Outcome of the once-only review transition.
#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    Transitioned(ProductEntity),
    Unchanged(ProductEntity),
    NotFound,
}
