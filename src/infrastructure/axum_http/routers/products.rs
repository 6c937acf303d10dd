use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    application::usecases::products::{ProductCatalogUseCase, ProductError},
    auth::AuthUser,
    domain::{
        repositories::products::ProductRepository, value_objects::products::SubmitProductModel,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad, repositories::products::ProductPostgres,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let product_repo = ProductPostgres::new(Arc::clone(&db_pool));
    let usecase = ProductCatalogUseCase::new(Arc::new(product_repo));

    Router::new()
        .route("/", post(submit_product))
        .route("/available", get(list_available))
        .with_state(Arc::new(usecase))
}

pub async fn submit_product<P>(
    State(usecase): State<Arc<ProductCatalogUseCase<P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(model): Json<SubmitProductModel>,
) -> impl IntoResponse
where
    P: ProductRepository + Send + Sync,
{
    match usecase.submit(user_id, model).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list_available<P>(
    State(usecase): State<Arc<ProductCatalogUseCase<P>>>,
) -> impl IntoResponse
where
    P: ProductRepository + Send + Sync,
{
    match usecase.list_available().await {
        Ok(products) => Json(products).into_response(),
        Err(err) => error_response(err),
    }
}

pub(super) fn error_response(err: ProductError) -> Response {
    let status = err.status_code();
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        "Internal server error".to_string()
    } else {
        err.to_string()
    };
    (status, message).into_response()
}
