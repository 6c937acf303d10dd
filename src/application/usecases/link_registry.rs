use std::sync::Arc;

use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::tracking_links::InsertTrackingLinkEntity,
    repositories::{products::ProductRepository, tracking_links::TrackingLinkRepository},
    value_objects::{
        enums::product_statuses::ProductStatus,
        tracking::{GenerateLinkModel, TrackingLinkModel},
    },
};

const SLUG_LEN: usize = 8;
const MAX_SLUG_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("link not found")]
    LinkNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("product is not eligible for tracking links")]
    ProductNotEligible,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl TrackingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            TrackingError::LinkNotFound | TrackingError::ProductNotFound => StatusCode::NOT_FOUND,
            TrackingError::ProductNotEligible => StatusCode::CONFLICT,
            TrackingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type TrackingResult<T> = std::result::Result<T, TrackingError>;

pub struct LinkRegistryUseCase<L, P>
where
    L: TrackingLinkRepository + Send + Sync,
    P: ProductRepository + Send + Sync,
{
    link_repo: Arc<L>,
    product_repo: Arc<P>,
    base_url: String,
}

impl<L, P> LinkRegistryUseCase<L, P>
where
    L: TrackingLinkRepository + Send + Sync,
    P: ProductRepository + Send + Sync,
{
    pub fn new(link_repo: Arc<L>, product_repo: Arc<P>, base_url: String) -> Self {
        Self {
            link_repo,
            product_repo,
            base_url,
        }
    }

    pub async fn create_link(
        &self,
        affiliate_id: Uuid,
        model: GenerateLinkModel,
    ) -> TrackingResult<TrackingLinkModel> {
        info!(
            %affiliate_id,
            product_id = model.product_id,
            "link registry: create link requested"
        );

        let product = self
            .product_repo
            .find_by_id(model.product_id)
            .await
            .map_err(|err| {
                error!(
                    product_id = model.product_id,
                    db_error = ?err,
                    "link registry: failed to load product"
                );
                TrackingError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(
                    %affiliate_id,
                    product_id = model.product_id,
                    "link registry: product not found"
                );
                TrackingError::ProductNotFound
            })?;

        if ProductStatus::from_str(&product.status) != Some(ProductStatus::Approved) {
            warn!(
                %affiliate_id,
                product_id = product.id,
                status = %product.status,
                "link registry: product not eligible"
            );
            return Err(TrackingError::ProductNotEligible);
        }

        let destination_url = format!(
            "{}/products/view/{}",
            self.base_url.trim_end_matches('/'),
            product.id
        );

        // Slugs are immutable once created; collisions are resolved by
        // retrying with a fresh one.
        for _ in 0..MAX_SLUG_ATTEMPTS {
            let slug = generate_slug();
            let created = self
                .link_repo
                .create(InsertTrackingLinkEntity {
                    user_id: affiliate_id,
                    product_id: product.id,
                    slug: slug.clone(),
                    destination_url: destination_url.clone(),
                    created_at: Utc::now(),
                })
                .await
                .map_err(|err| {
                    error!(
                        %affiliate_id,
                        product_id = product.id,
                        db_error = ?err,
                        "link registry: failed to persist tracking link"
                    );
                    TrackingError::Internal(err)
                })?;

            if let Some(entity) = created {
                info!(
                    %affiliate_id,
                    slug = %entity.slug,
                    "link registry: tracking link created"
                );
                return Ok(TrackingLinkModel::from_entity(&entity, &self.base_url));
            }

            warn!(%affiliate_id, slug = %slug, "link registry: slug collision, retrying");
        }

        Err(TrackingError::Internal(anyhow::anyhow!(
            "could not allocate a unique slug after {} attempts",
            MAX_SLUG_ATTEMPTS
        )))
    }

    pub async fn resolve(&self, slug: &str) -> TrackingResult<String> {
        let link = self
            .link_repo
            .find_by_slug(slug)
            .await
            .map_err(|err| {
                error!(slug, db_error = ?err, "link registry: failed to resolve slug");
                TrackingError::Internal(err)
            })?
            .ok_or(TrackingError::LinkNotFound)?;

        Ok(link.destination_url)
    }
}

fn generate_slug() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SLUG_LEN)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::{products::ProductEntity, tracking_links::TrackingLinkEntity},
        repositories::{
            products::MockProductRepository, tracking_links::MockTrackingLinkRepository,
        },
    };
    use mockall::predicate::eq;

    fn product(status: &str) -> ProductEntity {
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

    fn link_from(insert: &InsertTrackingLinkEntity) -> TrackingLinkEntity {
        TrackingLinkEntity {
            id: 1,
            user_id: insert.user_id,
            product_id: insert.product_id,
            slug: insert.slug.clone(),
            destination_url: insert.destination_url.clone(),
            created_at: insert.created_at,
        }
    }

    #[tokio::test]
    async fn creates_link_for_approved_product() {
        let mut product_repo = MockProductRepository::new();
        product_repo
            .expect_find_by_id()
            .with(eq(7))
            .returning(|_| Ok(Some(product("approved"))));

        let mut link_repo = MockTrackingLinkRepository::new();
        link_repo
            .expect_create()
            .times(1)
            .returning(|insert| Ok(Some(link_from(&insert))));

        let usecase = LinkRegistryUseCase::new(
            Arc::new(link_repo),
            Arc::new(product_repo),
            "https://example.test".to_string(),
        );

        let created = usecase
            .create_link(Uuid::new_v4(), GenerateLinkModel { product_id: 7 })
            .await
            .unwrap();

        assert_eq!(created.slug.len(), SLUG_LEN);
        assert_eq!(created.destination_url, "https://example.test/products/view/7");
        assert!(created.tracking_url.ends_with(&created.slug));
    }

    #[tokio::test]
    async fn rejects_unapproved_product() {
        let mut product_repo = MockProductRepository::new();
        product_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(product("pending"))));

        let mut link_repo = MockTrackingLinkRepository::new();
        link_repo.expect_create().never();

        let usecase = LinkRegistryUseCase::new(
            Arc::new(link_repo),
            Arc::new(product_repo),
            "https://example.test".to_string(),
        );

        let result = usecase
            .create_link(Uuid::new_v4(), GenerateLinkModel { product_id: 7 })
            .await;

        assert!(matches!(result, Err(TrackingError::ProductNotEligible)));
    }

    #[tokio::test]
    async fn retries_on_slug_collision() {
        let mut product_repo = MockProductRepository::new();
        product_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(product("approved"))));

        let mut link_repo = MockTrackingLinkRepository::new();
        let mut calls = 0;
        link_repo.expect_create().times(2).returning(move |insert| {
            calls += 1;
            if calls == 1 {
                Ok(None)
            } else {
                Ok(Some(link_from(&insert)))
            }
        });

        let usecase = LinkRegistryUseCase::new(
            Arc::new(link_repo),
            Arc::new(product_repo),
            "https://example.test".to_string(),
        );

        let created = usecase
            .create_link(Uuid::new_v4(), GenerateLinkModel { product_id: 7 })
            .await
            .unwrap();
        assert_eq!(created.slug.len(), SLUG_LEN);
    }

    #[tokio::test]
    async fn resolve_unknown_slug_is_not_found() {
        let product_repo = MockProductRepository::new();
        let mut link_repo = MockTrackingLinkRepository::new();
        link_repo
            .expect_find_by_slug()
            .with(eq("missing"))
            .returning(|_| Ok(None));

        let usecase = LinkRegistryUseCase::new(
            Arc::new(link_repo),
            Arc::new(product_repo),
            "https://example.test".to_string(),
        );

        assert!(matches!(
            usecase.resolve("missing").await,
            Err(TrackingError::LinkNotFound)
        ));
    }
}
