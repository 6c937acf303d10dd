pub mod commission_statuses;
pub mod payment_kinds;
pub mod payment_statuses;
pub mod product_statuses;
pub mod user_roles;
