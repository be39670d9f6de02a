//! Subscription domain entity

use uuid::Uuid;

use crate::domain::month::{Month, MonthRange};
use crate::shared::{DomainError, DomainResult};

/// Mutable part of a subscription: everything except the store-assigned id.
///
/// Only constructible through [`SubscriptionDraft::new`], so a draft in hand
/// always satisfies `price >= 0`, a non-blank service name and
/// `end_month >= start_month`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionDraft {
    service_name: String,
    price: i64,
    user_id: Uuid,
    start_month: Month,
    end_month: Option<Month>,
}

impl SubscriptionDraft {
    pub fn new(
        service_name: impl Into<String>,
        price: i64,
        user_id: Uuid,
        start_month: Month,
        end_month: Option<Month>,
    ) -> DomainResult<Self> {
        let service_name = service_name.into();
        if service_name.trim().is_empty() {
            return Err(DomainError::Validation("service name must not be empty".into()));
        }
        if price < 0 {
            return Err(DomainError::Validation(format!(
                "price must be non-negative, got {}",
                price
            )));
        }
        if let Some(end) = end_month {
            if end < start_month {
                return Err(DomainError::Validation(format!(
                    "end month {} is before start month {}",
                    end, start_month
                )));
            }
        }

        Ok(Self {
            service_name,
            price,
            user_id,
            start_month,
            end_month,
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn start_month(&self) -> Month {
        self.start_month
    }

    pub fn end_month(&self) -> Option<Month> {
        self.end_month
    }

    /// Attach a store-assigned id.
    pub fn into_subscription(self, id: Uuid) -> Subscription {
        Subscription {
            id,
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_month: self.start_month,
            end_month: self.end_month,
        }
    }
}

/// A persisted subscription. Callers always receive copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    /// Cost per active month, in minor currency units
    pub price: i64,
    pub user_id: Uuid,
    pub start_month: Month,
    /// Inclusive; `None` means open-ended
    pub end_month: Option<Month>,
}

impl Subscription {
    /// Whether the subscription is billed for `month`.
    pub fn is_active_in(&self, month: Month) -> bool {
        self.start_month <= month && self.end_month.map_or(true, |end| month <= end)
    }

    /// Whether any month of `range` falls inside the subscription.
    pub fn overlaps(&self, range: &MonthRange) -> bool {
        self.start_month <= range.end() && self.end_month.map_or(true, |end| end >= range.start())
    }
}

/// Parameters of a cost aggregation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostQuery {
    pub user_id: Uuid,
    pub service_name: String,
    pub range: MonthRange,
}

impl CostQuery {
    pub fn new(user_id: Uuid, service_name: impl Into<String>, range: MonthRange) -> Self {
        Self {
            user_id,
            service_name: service_name.into(),
            range,
        }
    }

    /// Filter applied before aggregation: same user, same service, overlapping interval.
    pub fn selects(&self, sub: &Subscription) -> bool {
        sub.user_id == self.user_id && sub.service_name == self.service_name && sub.overlaps(&self.range)
    }
}
