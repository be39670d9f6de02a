//! Subscription service: application-layer orchestration
//!
//! HTTP handlers are thin wrappers that delegate to this service. It owns
//! logging and metrics for every use case and bounds cost queries by the
//! caller's cancellation token and the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::subscription::{cost_breakdown, CostBreakdown};
use crate::domain::{
    CostQuery, DomainError, DomainResult, Month, RepositoryProvider, Subscription,
    SubscriptionDraft,
};

/// Default bound for a single cost query
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Service for subscription bookkeeping and cost queries
pub struct SubscriptionService {
    repos: Arc<dyn RepositoryProvider>,
    query_timeout: Duration,
}

impl SubscriptionService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repos,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub async fn create(&self, draft: SubscriptionDraft) -> DomainResult<Uuid> {
        let user_id = draft.user_id();
        let service_name = draft.service_name().to_string();

        let id = self.repos.subscriptions().create(draft).await?;
        metrics::counter!("subscriptions_mutations_total", "op" => "create").increment(1);

        info!(
            subscription_id = %id,
            user_id = %user_id,
            service_name = %service_name,
            "Subscription created"
        );
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Subscription> {
        self.repos.subscriptions().find_by_id(id).await
    }

    /// Replace every mutable field of `id` and return the new state.
    pub async fn update(&self, id: Uuid, draft: SubscriptionDraft) -> DomainResult<Subscription> {
        self.repos.subscriptions().update(id, draft.clone()).await?;
        metrics::counter!("subscriptions_mutations_total", "op" => "update").increment(1);

        let updated = draft.into_subscription(id);
        info!(
            subscription_id = %id,
            user_id = %updated.user_id,
            service_name = %updated.service_name,
            price = updated.price,
            "Subscription updated"
        );
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.repos.subscriptions().delete(id).await?;
        metrics::counter!("subscriptions_mutations_total", "op" => "delete").increment(1);
        info!(subscription_id = %id, "Subscription deleted");
        Ok(())
    }

    /// One page of subscriptions that started before `cutoff`.
    pub async fn list_before(&self, cutoff: Month) -> DomainResult<Vec<Subscription>> {
        let page = self.repos.subscriptions().list_before(cutoff).await?;
        debug!(cutoff = %cutoff, count = page.len(), "Subscriptions listed");
        Ok(page)
    }

    /// Total spend for `query`. See [`SubscriptionService::cost_breakdown`].
    pub async fn total_cost(&self, query: &CostQuery, cancel: &CancellationToken) -> DomainResult<i64> {
        Ok(self.cost_breakdown(query, cancel).await?.total)
    }

    /// Per-month charges for `query`.
    ///
    /// Fails with `DomainError::Cancelled` when `cancel` fires or the query
    /// outlives the configured timeout; a partial result is never returned.
    pub async fn cost_breakdown(
        &self,
        query: &CostQuery,
        cancel: &CancellationToken,
    ) -> DomainResult<CostBreakdown> {
        let result = self
            .cancellable(cancel, self.repos.subscriptions().find_overlapping(query))
            .await;

        let subscriptions = match result {
            Ok(subs) => subs,
            Err(e) => {
                let outcome = if matches!(e, DomainError::Cancelled(_)) { "cancelled" } else { "error" };
                metrics::counter!("cost_queries_total", "outcome" => outcome).increment(1);
                warn!(
                    user_id = %query.user_id,
                    service_name = %query.service_name,
                    error = %e,
                    transient = e.is_transient(),
                    "Cost query failed"
                );
                return Err(e);
            }
        };

        let breakdown = match cost_breakdown(query, &subscriptions) {
            Ok(breakdown) => breakdown,
            Err(e) => {
                metrics::counter!("cost_queries_total", "outcome" => "error").increment(1);
                warn!(
                    user_id = %query.user_id,
                    service_name = %query.service_name,
                    error = %e,
                    "Cost aggregation failed"
                );
                return Err(e);
            }
        };
        metrics::counter!("cost_queries_total", "outcome" => "ok").increment(1);

        info!(
            user_id = %query.user_id,
            service_name = %query.service_name,
            from = %query.range.start(),
            to = %query.range.end(),
            matched = subscriptions.len(),
            billed_months = breakdown.billed_months(),
            total_cost = breakdown.total,
            "Total cost calculated"
        );
        Ok(breakdown)
    }

    async fn cancellable<T>(
        &self,
        cancel: &CancellationToken,
        fut: impl Future<Output = DomainResult<T>>,
    ) -> DomainResult<T> {
        if cancel.is_cancelled() {
            return Err(DomainError::Cancelled("query cancelled by caller".into()));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DomainError::Cancelled("query cancelled by caller".into())),
            result = tokio::time::timeout(self.query_timeout, fut) => match result {
                Ok(inner) => inner,
                Err(_) => Err(DomainError::Cancelled(format!(
                    "query timed out after {}ms",
                    self.query_timeout.as_millis()
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{MonthRange, SubscriptionRepository};
    use crate::infrastructure::storage::{InMemoryRepositoryProvider, InMemorySubscriptionRepository};

    fn m(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn draft(user: Uuid, service: &str, price: i64, start: &str, end: Option<&str>) -> SubscriptionDraft {
        SubscriptionDraft::new(service, price, user, m(start), end.map(m)).unwrap()
    }

    fn service() -> SubscriptionService {
        SubscriptionService::new(Arc::new(InMemoryRepositoryProvider::new()))
    }

    /// Repository whose cost lookups never finish in time.
    struct StalledRepository {
        inner: InMemorySubscriptionRepository,
    }

    #[async_trait]
    impl SubscriptionRepository for StalledRepository {
        async fn create(&self, draft: SubscriptionDraft) -> DomainResult<Uuid> {
            self.inner.create(draft).await
        }
        async fn find_by_id(&self, id: Uuid) -> DomainResult<Subscription> {
            self.inner.find_by_id(id).await
        }
        async fn update(&self, id: Uuid, draft: SubscriptionDraft) -> DomainResult<()> {
            self.inner.update(id, draft).await
        }
        async fn delete(&self, id: Uuid) -> DomainResult<()> {
            self.inner.delete(id).await
        }
        async fn list_before(&self, cutoff: Month) -> DomainResult<Vec<Subscription>> {
            self.inner.list_before(cutoff).await
        }
        async fn find_overlapping(&self, query: &CostQuery) -> DomainResult<Vec<Subscription>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            self.inner.find_overlapping(query).await
        }
    }

    struct StalledProvider(StalledRepository);

    impl RepositoryProvider for StalledProvider {
        fn subscriptions(&self) -> &dyn SubscriptionRepository {
            &self.0
        }
    }

    fn stalled_service(timeout: Duration) -> SubscriptionService {
        let provider = StalledProvider(StalledRepository {
            inner: InMemorySubscriptionRepository::new(),
        });
        SubscriptionService::new(Arc::new(provider)).with_query_timeout(timeout)
    }

    fn query(user: Uuid, from: &str, to: &str) -> CostQuery {
        CostQuery::new(user, "Yandex Plus", MonthRange::new(m(from), m(to)).unwrap())
    }

    #[tokio::test]
    async fn create_read_update_read_round_trip() {
        let svc = service();
        let user = Uuid::new_v4();

        let original = draft(user, "Yandex Plus", 400, "07-2025", None);
        let id = svc.create(original.clone()).await.unwrap();
        assert_eq!(svc.get(id).await.unwrap(), original.into_subscription(id));

        let replacement = draft(user, "Yandex Plus Multi", 600, "08-2025", Some("12-2025"));
        let returned = svc.update(id, replacement.clone()).await.unwrap();
        assert_eq!(returned, replacement.clone().into_subscription(id));
        assert_eq!(svc.get(id).await.unwrap(), replacement.into_subscription(id));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let svc = service();
        let id = svc
            .create(draft(Uuid::new_v4(), "Spotify", 299, "01-2025", None))
            .await
            .unwrap();
        svc.delete(id).await.unwrap();
        assert!(svc.get(id).await.unwrap_err().is_not_found());
        assert!(svc.delete(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn total_cost_deduplicates_overlapping_months() {
        let svc = service();
        let user = Uuid::new_v4();
        svc.create(draft(user, "Yandex Plus", 100, "01-2025", Some("03-2025"))).await.unwrap();
        svc.create(draft(user, "Yandex Plus", 150, "02-2025", Some("04-2025"))).await.unwrap();

        let total = svc
            .total_cost(&query(user, "01-2025", "04-2025"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(total, 550);
    }

    #[tokio::test]
    async fn total_cost_without_matches_is_zero() {
        let svc = service();
        let total = svc
            .total_cost(&query(Uuid::new_v4(), "01-2000", "12-2030"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn already_cancelled_token_short_circuits() {
        let svc = service();
        let token = CancellationToken::new();
        token.cancel();

        let err = svc
            .total_cost(&query(Uuid::new_v4(), "01-2025", "02-2025"), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Cancelled(_)));
    }

    #[tokio::test]
    async fn cancelling_an_in_flight_query_aborts_it() {
        let svc = Arc::new(stalled_service(Duration::from_secs(3600)));
        let token = CancellationToken::new();

        let task = {
            let svc = svc.clone();
            let token = token.clone();
            tokio::spawn(async move {
                svc.total_cost(&query(Uuid::new_v4(), "01-2025", "02-2025"), &token)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, DomainError::Cancelled(_)));
    }

    #[tokio::test]
    async fn slow_query_times_out_as_cancelled() {
        let svc = stalled_service(Duration::from_millis(20));
        let err = svc
            .cost_breakdown(&query(Uuid::new_v4(), "01-2025", "02-2025"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Cancelled(msg) if msg.contains("timed out")));
    }
}
