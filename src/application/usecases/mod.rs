pub mod checkout;
pub mod click_ledger;
pub mod commission_engine;
pub mod iam;
pub mod link_registry;
pub mod products;
pub mod settlement;
