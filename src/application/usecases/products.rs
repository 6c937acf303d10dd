use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::products::InsertProductEntity,
    repositories::products::ProductRepository,
    value_objects::{
        enums::product_statuses::ProductStatus,
        money,
        products::{ProductModel, ReviewAction, ReviewOutcome, SubmitProductModel},
    },
};

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("product not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProductError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ProductError::NotFound => StatusCode::NOT_FOUND,
            ProductError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProductError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type ProductResult<T> = std::result::Result<T, ProductError>;

pub struct ProductCatalogUseCase<P>
where
    P: ProductRepository + Send + Sync,
{
    product_repo: Arc<P>,
}

impl<P> ProductCatalogUseCase<P>
where
    P: ProductRepository + Send + Sync,
{
    pub fn new(product_repo: Arc<P>) -> Self {
        Self { product_repo }
    }

    pub async fn submit(
        &self,
        owner_id: Uuid,
        model: SubmitProductModel,
    ) -> ProductResult<ProductModel> {
        if model.title.trim().is_empty() {
            return Err(ProductError::InvalidInput("title is required".to_string()));
        }

        let price_minor = money::parse_decimal_minor(&model.price)
            .map_err(|err| ProductError::InvalidInput(err.to_string()))?;
        if price_minor <= 0 {
            return Err(ProductError::InvalidInput(
                "price must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let product = self
            .product_repo
            .create(InsertProductEntity {
                owner_id,
                title: model.title,
                description: model.description,
                category: model.category.unwrap_or_else(|| "General".to_string()),
                price_minor,
                status: ProductStatus::Pending.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%owner_id, db_error = ?err, "products: failed to submit product");
                ProductError::Internal(err)
            })?;

        info!(%owner_id, product_id = product.id, "products: submitted for approval");
        Ok(ProductModel::from(product))
    }

    pub async fn list_available(&self) -> ProductResult<Vec<ProductModel>> {
        let products = self
            .product_repo
            .list_by_status(ProductStatus::Approved)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "products: failed to list approved products");
                ProductError::Internal(err)
            })?;

        Ok(products.into_iter().map(ProductModel::from).collect())
    }

    pub async fn list_pending(&self) -> ProductResult<Vec<ProductModel>> {
        let products = self
            .product_repo
            .list_by_status(ProductStatus::Pending)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "products: failed to list pending products");
                ProductError::Internal(err)
            })?;

        Ok(products.into_iter().map(ProductModel::from).collect())
    }

    /// Approves or rejects a pending product. The transition happens at most
    /// once; repeating a review returns the current state with no further
    /// effect.
    pub async fn review(
        &self,
        product_id: i64,
        action: ReviewAction,
    ) -> ProductResult<ProductModel> {
        let target = match action {
            ReviewAction::Approve => ProductStatus::Approved,
            ReviewAction::Reject => ProductStatus::Rejected,
        };

        let outcome = self
            .product_repo
            .review(product_id, target)
            .await
            .map_err(|err| {
                error!(product_id, db_error = ?err, "products: review failed");
                ProductError::Internal(err)
            })?;

        match outcome {
            ReviewOutcome::Transitioned(product) => {
                info!(product_id, status = %product.status, "products: review applied");
                Ok(ProductModel::from(product))
            }
            ReviewOutcome::Unchanged(product) => {
                warn!(
                    product_id,
                    status = %product.status,
                    "products: review repeated, state unchanged"
                );
                Ok(ProductModel::from(product))
            }
            ReviewOutcome::NotFound => Err(ProductError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::products::ProductEntity, repositories::products::MockProductRepository,
    };
    use mockall::predicate::eq;

    fn entity(status: &str) -> ProductEntity {
        ProductEntity {
            id: 7,
            owner_id: Uuid::new_v4(),
            title: "Deluxe Pack".to_string(),
            description: None,
            category: "General".to_string(),
            price_minor: 10_000,
            status: status.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn submit_parses_price_and_starts_pending() {
        let mut repo = MockProductRepository::new();
        repo.expect_create()
            .withf(|insert| insert.price_minor == 4_999 && insert.status == "pending")
            .returning(|insert| {
                Ok(ProductEntity {
                    id: 7,
                    owner_id: insert.owner_id,
                    title: insert.title,
                    description: insert.description,
                    category: insert.category,
                    price_minor: insert.price_minor,
                    status: insert.status,
                    created_at: insert.created_at,
                    updated_at: insert.updated_at,
                })
            });

        let usecase = ProductCatalogUseCase::new(Arc::new(repo));
        let product = usecase
            .submit(
                Uuid::new_v4(),
                SubmitProductModel {
                    title: "Deluxe Pack".to_string(),
                    description: None,
                    category: None,
                    price: "49.99".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(product.status, "pending");
        assert_eq!(product.price_minor, 4_999);
    }

    #[tokio::test]
    async fn submit_rejects_non_positive_price() {
        let usecase = ProductCatalogUseCase::new(Arc::new(MockProductRepository::new()));
        let result = usecase
            .submit(
                Uuid::new_v4(),
                SubmitProductModel {
                    title: "Free".to_string(),
                    description: None,
                    category: None,
                    price: "0".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(ProductError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn repeated_review_is_a_no_op() {
        let mut repo = MockProductRepository::new();
        let mut calls = 0;
        repo.expect_review()
            .with(eq(7), eq(ProductStatus::Approved))
            .times(2)
            .returning(move |_, _| {
                calls += 1;
                if calls == 1 {
                    Ok(ReviewOutcome::Transitioned(entity("approved")))
                } else {
                    Ok(ReviewOutcome::Unchanged(entity("approved")))
                }
            });

        let usecase = ProductCatalogUseCase::new(Arc::new(repo));
        let first = usecase.review(7, ReviewAction::Approve).await.unwrap();
        let second = usecase.review(7, ReviewAction::Approve).await.unwrap();

        assert_eq!(first.status, "approved");
        assert_eq!(second.status, "approved");
    }

    #[tokio::test]
    async fn review_of_unknown_product_is_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_review()
            .returning(|_, _| Ok(ReviewOutcome::NotFound));

        let usecase = ProductCatalogUseCase::new(Arc::new(repo));
        assert!(matches!(
            usecase.review(99, ReviewAction::Reject).await,
            Err(ProductError::NotFound)
        ));
    }
}
