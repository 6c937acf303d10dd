use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    application::usecases::{
        commission_engine::{CommissionEngine, CommissionError},
        link_registry::{LinkRegistryUseCase, TrackingError},
    },
    auth::AuthUser,
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{
            commissions::CommissionRepository, products::ProductRepository,
            tracking_links::TrackingLinkRepository, users::UserRepository,
        },
        value_objects::tracking::GenerateLinkModel,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{
            commissions::CommissionPostgres, products::ProductPostgres,
            tracking_links::TrackingLinkPostgres, users::UserPostgres,
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let link_repo = TrackingLinkPostgres::new(Arc::clone(&db_pool));
    let product_repo = ProductPostgres::new(Arc::clone(&db_pool));
    let commission_repo = CommissionPostgres::new(Arc::clone(&db_pool));
    let user_repo = UserPostgres::new(Arc::clone(&db_pool));

    let link_registry = LinkRegistryUseCase::new(
        Arc::new(link_repo),
        Arc::new(product_repo),
        config.tracking.base_url.clone(),
    );
    let commission_engine = CommissionEngine::new(
        Arc::new(commission_repo),
        Arc::new(user_repo),
        config.commission.affiliate_rate_bps,
        config.commission.platform_fee_bps,
    );

    Router::new()
        .route("/links", post(generate_link))
        .route("/earnings", get(earnings))
        .with_state((Arc::new(link_registry), Arc::new(commission_engine)))
}

pub async fn generate_link<L, P, C, U>(
    State((link_registry, _)): State<(
        Arc<LinkRegistryUseCase<L, P>>,
        Arc<CommissionEngine<C, U>>,
    )>,
    AuthUser { user_id, .. }: AuthUser,
    Json(model): Json<GenerateLinkModel>,
) -> impl IntoResponse
where
    L: TrackingLinkRepository + Send + Sync,
    P: ProductRepository + Send + Sync,
    C: CommissionRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    match link_registry.create_link(user_id, model).await {
        Ok(link) => Json(link).into_response(),
        Err(err) => tracking_error_response(err),
    }
}

pub async fn earnings<L, P, C, U>(
    State((_, commission_engine)): State<(
        Arc<LinkRegistryUseCase<L, P>>,
        Arc<CommissionEngine<C, U>>,
    )>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    L: TrackingLinkRepository + Send + Sync,
    P: ProductRepository + Send + Sync,
    C: CommissionRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    match commission_engine.earnings(user_id).await {
        Ok(earnings) => Json(earnings).into_response(),
        Err(err @ CommissionError::Internal(_)) => (
            err.status_code(),
            "Failed to load earnings".to_string(),
        )
            .into_response(),
    }
}

fn tracking_error_response(err: TrackingError) -> Response {
    let status = err.status_code();
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        "Internal server error".to_string()
    } else {
        err.to_string()
    };
    (status, message).into_response()
}
