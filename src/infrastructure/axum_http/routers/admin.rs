use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use crate::{
    application::{
        notifier::Notifier,
        usecases::{
            products::ProductCatalogUseCase,
            settlement::{SettlementError, SettlementUseCase},
        },
    },
    auth::AdminUser,
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{
            products::ProductRepository, settlements::SettlementRepository, users::UserRepository,
        },
        value_objects::products::ReviewAction,
    },
    infrastructure::{
        axum_http::routers::products::error_response as product_error_response,
        notifier::WebhookNotifier,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                products::ProductPostgres, settlements::SettlementPostgres, users::UserPostgres,
            },
        },
    },
};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let product_repo = ProductPostgres::new(Arc::clone(&db_pool));
    let user_repo = UserPostgres::new(Arc::clone(&db_pool));
    let settlement_repo =
        SettlementPostgres::new(Arc::clone(&db_pool), config.paypal.currency.clone());
    let notifier = WebhookNotifier::new(config.tracking.notify_webhook_url.clone());

    let products = ProductCatalogUseCase::new(Arc::new(product_repo));
    let settlement = SettlementUseCase::new(
        Arc::new(user_repo),
        Arc::new(settlement_repo),
        Arc::new(notifier),
        config.commission.payout_min_minor,
    );

    Router::new()
        .route("/pending-products", get(list_pending_products))
        .route("/products/:product_id/review", post(review_product))
        .route("/settlements/run", post(run_settlement))
        .with_state((Arc::new(products), Arc::new(settlement)))
}

pub async fn list_pending_products<P, U, S, N>(
    State((products, _)): State<(
        Arc<ProductCatalogUseCase<P>>,
        Arc<SettlementUseCase<U, S, N>>,
    )>,
    _admin: AdminUser,
) -> impl IntoResponse
where
    P: ProductRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    S: SettlementRepository + Send + Sync,
    N: Notifier,
{
    match products.list_pending().await {
        Ok(pending) => Json(pending).into_response(),
        Err(err) => product_error_response(err),
    }
}

pub async fn review_product<P, U, S, N>(
    State((products, _)): State<(
        Arc<ProductCatalogUseCase<P>>,
        Arc<SettlementUseCase<U, S, N>>,
    )>,
    AdminUser(admin): AdminUser,
    Path(product_id): Path<i64>,
    Json(request): Json<ReviewRequest>,
) -> impl IntoResponse
where
    P: ProductRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    S: SettlementRepository + Send + Sync,
    N: Notifier,
{
    info!(
        admin_id = %admin.user_id,
        product_id,
        action = ?request.action,
        "admin: product review requested"
    );

    match products.review(product_id, request.action).await {
        Ok(product) => Json(product).into_response(),
        Err(err) => product_error_response(err),
    }
}

pub async fn run_settlement<P, U, S, N>(
    State((_, settlement)): State<(
        Arc<ProductCatalogUseCase<P>>,
        Arc<SettlementUseCase<U, S, N>>,
    )>,
    AdminUser(admin): AdminUser,
) -> impl IntoResponse
where
    P: ProductRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    S: SettlementRepository + Send + Sync,
    N: Notifier,
{
    info!(admin_id = %admin.user_id, "admin: settlement run triggered");

    match settlement.settle_pending().await {
        Ok(results) => Json(results).into_response(),
        Err(err @ SettlementError::Internal(_)) => (
            err.status_code(),
            "Settlement run failed".to_string(),
        )
            .into_response(),
    }
}
