#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub jwt: Jwt,
    pub paypal: PayPal,
    pub commission: Commission,
    pub tracking: Tracking,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Jwt {
    pub secret: String,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct PayPal {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub currency: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct Commission {
    pub affiliate_rate_bps: i64,
    pub platform_fee_bps: i64,
    pub payout_min_minor: i64,
    pub settlement_interval_seconds: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Tracking {
    pub base_url: String,
    pub cookie_max_age_days: i64,
    pub notify_webhook_url: Option<String>,
}
