//! # Subscription Ledger
//!
//! REST service that records users' recurring subscriptions and reports how
//! much a user spent on a service over a range of calendar months.
//!
//! ## Architecture
//!
//! - **domain**: months, subscriptions, the repository contract and cost aggregation
//! - **application**: `SubscriptionService`, the use cases with logging, metrics and timeouts
//! - **infrastructure**: SeaORM (SQLite / PostgreSQL) and in-memory repositories
//! - **interfaces**: axum REST API with Swagger documentation
//! - **server**: process lifecycle shared by the binary and tests

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use application::SubscriptionService;
pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider};
pub use interfaces::http::create_api_router;
