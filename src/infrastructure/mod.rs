pub mod axum_http;
pub mod notifier;
pub mod paypal;
pub mod postgres;
