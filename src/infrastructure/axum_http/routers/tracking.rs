use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::error;

use crate::{
    application::usecases::{
        click_ledger::ClickLedgerUseCase,
        link_registry::TrackingError,
    },
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{clicks::ClickRepository, tracking_links::TrackingLinkRepository},
        value_objects::tracking::ClientMeta,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{clicks::ClickPostgres, tracking_links::TrackingLinkPostgres},
    },
};

pub const ATTRIBUTION_COOKIE: &str = "affiliate_click_id";

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let click_repo = ClickPostgres::new(Arc::clone(&db_pool));
    let link_repo = TrackingLinkPostgres::new(Arc::clone(&db_pool));
    let usecase = ClickLedgerUseCase::new(Arc::new(click_repo), Arc::new(link_repo));

    Router::new()
        .route("/:slug", get(track_click))
        .with_state((Arc::new(usecase), config))
}

pub async fn track_click<C, L>(
    State((usecase, config)): State<(Arc<ClickLedgerUseCase<C, L>>, Arc<DotEnvyConfig>)>,
    Path(slug): Path<String>,
    jar: CookieJar,
    headers: HeaderMap,
) -> impl IntoResponse
where
    C: ClickRepository + Send + Sync,
    L: TrackingLinkRepository + Send + Sync,
{
    let client_meta = client_meta_from_headers(&headers);

    match usecase.record_click(&slug, client_meta).await {
        Ok(recorded) => {
            let cookie = Cookie::build((ATTRIBUTION_COOKIE, recorded.click_id.to_string()))
                .path("/")
                .http_only(true)
                .max_age(cookie::time::Duration::days(
                    config.tracking.cookie_max_age_days,
                ))
                .build();

            (
                jar.add(cookie),
                (
                    StatusCode::FOUND,
                    [(header::LOCATION, recorded.destination_url)],
                ),
            )
                .into_response()
        }
        Err(TrackingError::LinkNotFound) => {
            (StatusCode::NOT_FOUND, "Link not found".to_string()).into_response()
        }
        Err(err) => {
            error!(slug, error = ?err, "tracking: redirect failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            )
                .into_response()
        }
    }
}

fn client_meta_from_headers(headers: &HeaderMap) -> ClientMeta {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string());

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    ClientMeta {
        ip_address,
        user_agent,
    }
}
