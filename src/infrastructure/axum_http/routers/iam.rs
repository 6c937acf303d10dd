use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;

use crate::{
    application::{
        notifier::Notifier,
        usecases::iam::{IamError, IamUseCase},
    },
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{password_resets::PasswordResetRepository, users::UserRepository},
        value_objects::iam::{
            ForgotPasswordModel, LoginModel, RegisterUserModel, ResetPasswordModel,
            VerifyResetCodeModel,
        },
    },
    infrastructure::{
        notifier::WebhookNotifier,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{password_resets::PasswordResetPostgres, users::UserPostgres},
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let user_repo = UserPostgres::new(Arc::clone(&db_pool));
    let reset_repo = PasswordResetPostgres::new(Arc::clone(&db_pool));
    let notifier = WebhookNotifier::new(config.tracking.notify_webhook_url.clone());

    let usecase = IamUseCase::new(
        Arc::new(user_repo),
        Arc::new(reset_repo),
        Arc::new(notifier),
        config.jwt.secret.clone(),
        config.jwt.ttl_seconds,
    );

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/verify-code", post(verify_code))
        .route("/reset-password", post(reset_password))
        .with_state(Arc::new(usecase))
}

pub async fn register<U, R, N>(
    State(usecase): State<Arc<IamUseCase<U, R, N>>>,
    Json(model): Json<RegisterUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync,
    R: PasswordResetRepository + Send + Sync,
    N: Notifier,
{
    match usecase.register(model).await {
        Ok(registered) => (StatusCode::CREATED, Json(registered)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn login<U, R, N>(
    State(usecase): State<Arc<IamUseCase<U, R, N>>>,
    Json(model): Json<LoginModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync,
    R: PasswordResetRepository + Send + Sync,
    N: Notifier,
{
    match usecase.login(model).await {
        Ok(token) => Json(token).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn forgot_password<U, R, N>(
    State(usecase): State<Arc<IamUseCase<U, R, N>>>,
    Json(model): Json<ForgotPasswordModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync,
    R: PasswordResetRepository + Send + Sync,
    N: Notifier,
{
    match usecase.request_password_reset(&model.email).await {
        Ok(()) => Json(json!({ "message": "Recovery code sent" })).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn verify_code<U, R, N>(
    State(usecase): State<Arc<IamUseCase<U, R, N>>>,
    Json(model): Json<VerifyResetCodeModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync,
    R: PasswordResetRepository + Send + Sync,
    N: Notifier,
{
    match usecase.verify_reset_code(model).await {
        Ok(()) => Json(json!({ "message": "Code verified" })).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn reset_password<U, R, N>(
    State(usecase): State<Arc<IamUseCase<U, R, N>>>,
    Json(model): Json<ResetPasswordModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync,
    R: PasswordResetRepository + Send + Sync,
    N: Notifier,
{
    match usecase.reset_password(model).await {
        Ok(()) => Json(json!({ "message": "Password reset successfully" })).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: IamError) -> Response {
    let status = err.status_code();
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        "Internal server error".to_string()
    } else {
        err.to_string()
    };
    (status, message).into_response()
}
