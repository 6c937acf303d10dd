use anyhow::{Ok, Result};

use super::config_model::DotEnvyConfig;
use crate::config::stage::Stage;

const PAYPAL_SANDBOX_URL: &str = "https://api-m.sandbox.paypal.com";
const PAYPAL_LIVE_URL: &str = "https://api-m.paypal.com";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = super::config_model::Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = super::config_model::Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let jwt = super::config_model::Jwt {
        secret: std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"),
        ttl_seconds: std::env::var("JWT_TTL_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()?,
    };

    let paypal_base_url = match get_stage() {
        Stage::Production => PAYPAL_LIVE_URL.to_string(),
        Stage::Local => PAYPAL_SANDBOX_URL.to_string(),
    };

    let paypal = super::config_model::PayPal {
        client_id: std::env::var("PAYPAL_CLIENT_ID").expect("PAYPAL_CLIENT_ID is invalid"),
        client_secret: std::env::var("PAYPAL_CLIENT_SECRET")
            .expect("PAYPAL_CLIENT_SECRET is invalid"),
        base_url: std::env::var("PAYPAL_BASE_URL").unwrap_or(paypal_base_url),
        currency: std::env::var("PAYPAL_CURRENCY").unwrap_or_else(|_| "USD".to_string()),
        timeout_seconds: std::env::var("PAYPAL_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()?,
    };

    let commission = super::config_model::Commission {
        affiliate_rate_bps: std::env::var("COMMISSION_AFFILIATE_RATE_BPS")
            .unwrap_or_else(|_| "1500".to_string())
            .parse()?,
        platform_fee_bps: std::env::var("COMMISSION_PLATFORM_FEE_BPS")
            .unwrap_or_else(|_| "500".to_string())
            .parse()?,
        payout_min_minor: std::env::var("PAYOUT_MIN_MINOR")
            .unwrap_or_else(|_| "100".to_string())
            .parse()?,
        settlement_interval_seconds: std::env::var("SETTLEMENT_INTERVAL_SECONDS")
            .ok()
            .map(|raw| raw.parse())
            .transpose()?,
    };

    let tracking = super::config_model::Tracking {
        base_url: std::env::var("BASE_URL").expect("BASE_URL is invalid"),
        cookie_max_age_days: std::env::var("TRACKING_COOKIE_MAX_AGE_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?,
        notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").ok(),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        jwt,
        paypal,
        commission,
        tracking,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(stage_str.as_str()).unwrap_or_default()
}

pub fn get_jwt_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    Ok(std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"))
}
