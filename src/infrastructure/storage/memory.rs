//! In-memory storage implementation

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::subscription::{
    CostQuery, Subscription, SubscriptionDraft, SubscriptionRepository, LIST_PAGE_SIZE,
};
use crate::domain::{DomainError, DomainResult, Month, RepositoryProvider};

/// In-memory subscription store for development and testing.
///
/// Check-and-mutate happens under the DashMap shard lock of the key
/// (`get_mut` / `remove`), so a concurrent delete can never resurrect a row.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: DashMap<Uuid, Subscription>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, draft: SubscriptionDraft) -> DomainResult<Uuid> {
        let id = Uuid::new_v4();
        self.subscriptions.insert(id, draft.into_subscription(id));
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Subscription> {
        self.subscriptions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DomainError::subscription_not_found(id))
    }

    async fn update(&self, id: Uuid, draft: SubscriptionDraft) -> DomainResult<()> {
        match self.subscriptions.get_mut(&id) {
            Some(mut entry) => {
                *entry = draft.into_subscription(id);
                Ok(())
            }
            None => Err(DomainError::subscription_not_found(id)),
        }
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.subscriptions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::subscription_not_found(id))
    }

    async fn list_before(&self, cutoff: Month) -> DomainResult<Vec<Subscription>> {
        let mut page: Vec<Subscription> = self
            .subscriptions
            .iter()
            .filter(|entry| entry.start_month < cutoff)
            .map(|entry| entry.value().clone())
            .collect();
        page.sort_by(|a, b| b.start_month.cmp(&a.start_month));
        page.truncate(LIST_PAGE_SIZE as usize);
        Ok(page)
    }

    async fn find_overlapping(&self, query: &CostQuery) -> DomainResult<Vec<Subscription>> {
        let mut matches: Vec<Subscription> = self
            .subscriptions
            .iter()
            .filter(|entry| query.selects(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by_key(|s| s.start_month);
        Ok(matches)
    }
}

/// Repository provider backed entirely by memory.
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    subscriptions: InMemorySubscriptionRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn subscriptions(&self) -> &dyn SubscriptionRepository {
        &self.subscriptions
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::MonthRange;

    fn m(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn draft(user: Uuid, price: i64, start: &str, end: Option<&str>) -> SubscriptionDraft {
        SubscriptionDraft::new("Yandex Plus", price, user, m(start), end.map(m)).unwrap()
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();

        let id = repo.create(draft(user, 100, "01-2025", None)).await.unwrap();
        assert_eq!(repo.find_by_id(id).await.unwrap().price, 100);

        repo.update(id, draft(user, 250, "02-2025", Some("06-2025"))).await.unwrap();
        let updated = repo.find_by_id(id).await.unwrap();
        assert_eq!(updated.price, 250);
        assert_eq!(updated.end_month, Some(m("06-2025")));

        repo.delete(id).await.unwrap();
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn missing_ids_are_not_found_without_side_effects() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();
        repo.create(draft(user, 100, "01-2025", None)).await.unwrap();

        let ghost = Uuid::new_v4();
        assert!(repo.update(ghost, draft(user, 1, "01-2025", None)).await.unwrap_err().is_not_found());
        assert!(repo.delete(ghost).await.unwrap_err().is_not_found());
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn update_racing_delete_never_resurrects() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let user = Uuid::new_v4();
        let id = repo.create(draft(user, 100, "01-2025", None)).await.unwrap();

        let deleter = {
            let repo = repo.clone();
            tokio::spawn(async move { repo.delete(id).await })
        };
        let updater = {
            let repo = repo.clone();
            tokio::spawn(async move { repo.update(id, draft(user, 500, "01-2025", None)).await })
        };

        deleter.await.unwrap().unwrap();
        let _ = updater.await.unwrap();
        assert!(repo.find_by_id(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_and_overlap_follow_the_repository_contract() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();
        for month in 1..=11 {
            repo.create(draft(user, 10, &format!("{:02}-2024", month), None)).await.unwrap();
        }
        repo.create(draft(user, 10, "01-2026", None)).await.unwrap();

        let page = repo.list_before(m("01-2026")).await.unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].start_month, m("11-2024"));
        assert_eq!(page[9].start_month, m("02-2024"));

        let query = CostQuery::new(user, "Yandex Plus", MonthRange::new(m("06-2024"), m("06-2024")).unwrap());
        assert_eq!(repo.find_overlapping(&query).await.unwrap().len(), 6);
    }
}
