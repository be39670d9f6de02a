//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::repositories::RepositoryProvider;
use crate::domain::subscription::SubscriptionRepository;

use super::subscription_repository::SeaOrmSubscriptionRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let sub = repos.subscriptions().find_by_id(id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    subscriptions: SeaOrmSubscriptionRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            subscriptions: SeaOrmSubscriptionRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn subscriptions(&self) -> &dyn SubscriptionRepository {
        &self.subscriptions
    }
}
