//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider` - unified access to the per-aggregate repositories
//! - `DomainResult` - standard result type for domain operations

use super::subscription::SubscriptionRepository;

pub use crate::shared::errors::{DomainError, DomainResult};

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let sub = repos.subscriptions().find_by_id(id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn subscriptions(&self) -> &dyn SubscriptionRepository;
}
