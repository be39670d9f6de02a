//! Per-resource HTTP modules

pub mod health;
pub mod metrics;
pub mod request_id;
pub mod subscriptions;
