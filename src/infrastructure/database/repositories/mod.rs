//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod repository_provider;
pub mod subscription_repository;

pub use repository_provider::SeaOrmRepositoryProvider;
pub use subscription_repository::SeaOrmSubscriptionRepository;
