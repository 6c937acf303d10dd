use anyhow::Result;
use linkpay::application::usecases::settlement::{self, SettlementUseCase};
use linkpay::config::config_loader;
use linkpay::infrastructure::axum_http::http_serve;
use linkpay::infrastructure::notifier::WebhookNotifier;
use linkpay::infrastructure::postgres::postgres_connection;
use linkpay::infrastructure::postgres::repositories::{
    settlements::SettlementPostgres, users::UserPostgres,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Server exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let config = Arc::new(dotenvy_env);
    let db_pool = Arc::new(postgres_pool);

    if let Some(interval_seconds) = config.commission.settlement_interval_seconds {
        let settlement_usecase = SettlementUseCase::new(
            Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
            Arc::new(SettlementPostgres::new(
                Arc::clone(&db_pool),
                config.paypal.currency.clone(),
            )),
            Arc::new(WebhookNotifier::new(
                config.tracking.notify_webhook_url.clone(),
            )),
            config.commission.payout_min_minor,
        );

        info!(interval_seconds, "Settlement loop enabled");
        tokio::spawn(settlement::run_settlement_loop(
            Arc::new(settlement_usecase),
            Duration::from_secs(interval_seconds),
        ));
    }

    http_serve::start(config, db_pool).await?;

    Ok(())
}
