use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::usecases::{
        checkout::{CheckoutError, CheckoutUseCase, PaymentGateway},
        commission_engine::CommissionEngine,
    },
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{
            clicks::ClickRepository, commissions::CommissionRepository,
            payments::PaymentRepository, products::ProductRepository, users::UserRepository,
        },
        value_objects::checkout::{CreateOrderModel, LegacyCaptureModel},
    },
    infrastructure::{
        axum_http::routers::tracking::ATTRIBUTION_COOKIE,
        paypal::client::PayPalClient,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                clicks::ClickPostgres, commissions::CommissionPostgres,
                payments::PaymentPostgres, products::ProductPostgres, users::UserPostgres,
            },
        },
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct CaptureOrderRequest {
    #[serde(default)]
    pub affiliate_id: Option<Uuid>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Result<Router> {
    let payment_repo = PaymentPostgres::new(Arc::clone(&db_pool));
    let product_repo = ProductPostgres::new(Arc::clone(&db_pool));
    let click_repo = ClickPostgres::new(Arc::clone(&db_pool));
    let commission_repo = CommissionPostgres::new(Arc::clone(&db_pool));
    let user_repo = UserPostgres::new(Arc::clone(&db_pool));
    let gateway = PayPalClient::new(&config.paypal)?;

    let commission_engine = CommissionEngine::new(
        Arc::new(commission_repo),
        Arc::new(user_repo),
        config.commission.affiliate_rate_bps,
        config.commission.platform_fee_bps,
    );

    let usecase = CheckoutUseCase::new(
        Arc::new(payment_repo),
        Arc::new(product_repo),
        Arc::new(click_repo),
        Arc::new(commission_engine),
        Arc::new(gateway),
        config.paypal.currency.clone(),
    );

    Ok(Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:order_id/capture", post(capture_order))
        .route("/capture", post(capture_external))
        .with_state(Arc::new(usecase)))
}

pub async fn create_order<Pay, Prod, Clk, Com, Usr, G>(
    State(usecase): State<Arc<CheckoutUseCase<Pay, Prod, Clk, Com, Usr, G>>>,
    Json(model): Json<CreateOrderModel>,
) -> impl IntoResponse
where
    Pay: PaymentRepository + Send + Sync,
    Prod: ProductRepository + Send + Sync,
    Clk: ClickRepository + Send + Sync,
    Com: CommissionRepository + Send + Sync,
    Usr: UserRepository + Send + Sync,
    G: PaymentGateway + Send + Sync,
{
    match usecase.create_order(model).await {
        Ok(created) => Json(created).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn capture_order<Pay, Prod, Clk, Com, Usr, G>(
    State(usecase): State<Arc<CheckoutUseCase<Pay, Prod, Clk, Com, Usr, G>>>,
    Path(order_id): Path<String>,
    jar: CookieJar,
    body: Option<Json<CaptureOrderRequest>>,
) -> impl IntoResponse
where
    Pay: PaymentRepository + Send + Sync,
    Prod: ProductRepository + Send + Sync,
    Clk: ClickRepository + Send + Sync,
    Com: CommissionRepository + Send + Sync,
    Usr: UserRepository + Send + Sync,
    G: PaymentGateway + Send + Sync,
{
    let explicit_affiliate = body.and_then(|Json(req)| req.affiliate_id);
    let click_cookie = attribution_cookie(&jar);

    match usecase
        .capture_order(&order_id, explicit_affiliate, click_cookie)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn capture_external<Pay, Prod, Clk, Com, Usr, G>(
    State(usecase): State<Arc<CheckoutUseCase<Pay, Prod, Clk, Com, Usr, G>>>,
    jar: CookieJar,
    Json(model): Json<LegacyCaptureModel>,
) -> impl IntoResponse
where
    Pay: PaymentRepository + Send + Sync,
    Prod: ProductRepository + Send + Sync,
    Clk: ClickRepository + Send + Sync,
    Com: CommissionRepository + Send + Sync,
    Usr: UserRepository + Send + Sync,
    G: PaymentGateway + Send + Sync,
{
    let click_cookie = attribution_cookie(&jar);

    match usecase.capture_external(model, click_cookie).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => error_response(err),
    }
}

fn attribution_cookie(jar: &CookieJar) -> Option<Uuid> {
    jar.get(ATTRIBUTION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

fn error_response(err: CheckoutError) -> Response {
    let status = err.status_code();
    let message = match status {
        StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
        // Retry-friendly: the payment was not recorded as completed.
        StatusCode::BAD_GATEWAY => "Payment could not be completed, please try again".to_string(),
        _ => err.to_string(),
    };
    (status, message).into_response()
}
