//! Subscription repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{CostQuery, Subscription, SubscriptionDraft};
use crate::domain::month::Month;
use crate::domain::DomainResult;

/// Maximum number of records returned by [`SubscriptionRepository::list_before`].
pub const LIST_PAGE_SIZE: u64 = 10;

/// Persistent store of subscriptions.
///
/// `update` and `delete` must decide existence and mutate in one atomic step:
/// a missing id yields `DomainError::NotFound` and leaves the store untouched.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Persist a new record and return its freshly generated id.
    async fn create(&self, draft: SubscriptionDraft) -> DomainResult<Uuid>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Subscription>;

    /// Replace every mutable field of `id`.
    async fn update(&self, id: Uuid, draft: SubscriptionDraft) -> DomainResult<()>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// Up to [`LIST_PAGE_SIZE`] records with `start_month < cutoff`, most recent start first.
    async fn list_before(&self, cutoff: Month) -> DomainResult<Vec<Subscription>>;

    /// Records of the query's user and service whose interval overlaps the query range.
    async fn find_overlapping(&self, query: &CostQuery) -> DomainResult<Vec<Subscription>>;
}
