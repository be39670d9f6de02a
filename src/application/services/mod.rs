//! Application services

pub mod subscription;

pub use subscription::{SubscriptionService, DEFAULT_QUERY_TIMEOUT};
