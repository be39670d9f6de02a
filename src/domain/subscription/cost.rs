//! Monthly cost aggregation
//!
//! The query range is expanded into discrete calendar months first. Each
//! month is then charged once, at the highest price among the selected
//! subscriptions active in that month, so overlapping plans for the same
//! service never add up.

use uuid::Uuid;

use super::model::{CostQuery, Subscription};
use crate::domain::month::Month;
use crate::domain::{DomainError, DomainResult};

/// Charge for a single month of the query range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyCharge {
    pub month: Month,
    /// Highest price active this month, 0 if nothing was active
    pub price: i64,
    /// Subscription that set the price; `None` for uncovered months
    pub subscription_id: Option<Uuid>,
}

/// Cost breakdown for a [`CostQuery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostBreakdown {
    pub months: Vec<MonthlyCharge>,
    pub total: i64,
}

impl CostBreakdown {
    /// Months in which at least one subscription was active.
    pub fn billed_months(&self) -> usize {
        self.months.iter().filter(|c| c.subscription_id.is_some()).count()
    }
}

/// Total spend for `query` over `subscriptions`.
///
/// `subscriptions` may contain records for other users or services; they are
/// filtered out here.
pub fn total_cost(query: &CostQuery, subscriptions: &[Subscription]) -> DomainResult<i64> {
    Ok(cost_breakdown(query, subscriptions)?.total)
}

/// Per-month charges and total for `query` over `subscriptions`.
///
/// Fails with `DomainError::Validation` when the total does not fit in `i64`.
pub fn cost_breakdown(
    query: &CostQuery,
    subscriptions: &[Subscription],
) -> DomainResult<CostBreakdown> {
    let selected: Vec<&Subscription> = subscriptions.iter().filter(|s| query.selects(s)).collect();

    let months: Vec<MonthlyCharge> = query
        .range
        .months()
        .map(|month| {
            // Ties keep the first subscription encountered.
            let best = selected
                .iter()
                .copied()
                .filter(|s| s.is_active_in(month))
                .fold(None::<&Subscription>, |best, s| match best {
                    Some(b) if b.price >= s.price => Some(b),
                    _ => Some(s),
                });

            MonthlyCharge {
                month,
                price: best.map_or(0, |s| s.price),
                subscription_id: best.map(|s| s.id),
            }
        })
        .collect();

    let total = months
        .iter()
        .try_fold(0i64, |acc, c| acc.checked_add(c.price))
        .ok_or_else(|| {
            DomainError::Validation(format!(
                "total cost over {} months exceeds {}",
                months.len(),
                i64::MAX
            ))
        })?;
    Ok(CostBreakdown { months, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::month::MonthRange;
    use crate::domain::subscription::SubscriptionDraft;

    fn m(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn sub(user: Uuid, service: &str, price: i64, start: &str, end: Option<&str>) -> Subscription {
        SubscriptionDraft::new(service, price, user, m(start), end.map(m))
            .unwrap()
            .into_subscription(Uuid::new_v4())
    }

    fn query(user: Uuid, service: &str, from: &str, to: &str) -> CostQuery {
        CostQuery::new(user, service, MonthRange::new(m(from), m(to)).unwrap())
    }

    #[test]
    fn overlapping_plans_charge_the_highest_price_per_month() {
        let user = Uuid::new_v4();
        let subs = vec![
            sub(user, "Yandex Plus", 100, "01-2025", Some("03-2025")),
            sub(user, "Yandex Plus", 150, "02-2025", Some("04-2025")),
        ];

        let q = query(user, "Yandex Plus", "01-2025", "04-2025");
        assert_eq!(total_cost(&q, &subs).unwrap(), 550);

        let breakdown = cost_breakdown(&q, &subs).unwrap();
        let prices: Vec<i64> = breakdown.months.iter().map(|c| c.price).collect();
        assert_eq!(prices, [100, 150, 150, 150]);
        assert_eq!(breakdown.months[1].subscription_id, Some(subs[1].id));
    }

    #[test]
    fn open_ended_subscription_covers_every_later_month() {
        let user = Uuid::new_v4();
        let subs = vec![sub(user, "Spotify", 299, "01-2025", None)];
        assert_eq!(total_cost(&query(user, "Spotify", "03-2025", "05-2025"), &subs).unwrap(), 3 * 299);
    }

    #[test]
    fn no_matching_subscription_costs_nothing() {
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let subs = vec![
            sub(other, "Spotify", 299, "01-2025", None),
            sub(user, "Netflix", 500, "01-2025", None),
        ];

        let q = query(user, "Spotify", "01-2020", "12-2030");
        let breakdown = cost_breakdown(&q, &subs).unwrap();
        assert_eq!(breakdown.total, 0);
        assert_eq!(breakdown.billed_months(), 0);
        assert_eq!(breakdown.months.len(), q.range.months().count());
    }

    #[test]
    fn partial_overlap_only_counts_months_inside_the_range() {
        let user = Uuid::new_v4();
        let subs = vec![sub(user, "iCloud", 99, "10-2024", Some("02-2025"))];
        // Dec, Jan, Feb inside the range; Mar, Apr uncovered.
        assert_eq!(total_cost(&query(user, "iCloud", "12-2024", "04-2025"), &subs).unwrap(), 3 * 99);
    }

    #[test]
    fn gaps_between_plans_contribute_zero() {
        let user = Uuid::new_v4();
        let subs = vec![
            sub(user, "Kinopoisk", 200, "01-2025", Some("01-2025")),
            sub(user, "Kinopoisk", 300, "04-2025", Some("04-2025")),
        ];
        let breakdown = cost_breakdown(&query(user, "Kinopoisk", "01-2025", "04-2025"), &subs).unwrap();
        assert_eq!(breakdown.total, 500);
        assert_eq!(breakdown.billed_months(), 2);
        assert_eq!(breakdown.months[1].subscription_id, None);
    }

    #[test]
    fn identical_overlapping_plans_are_not_double_billed() {
        let user = Uuid::new_v4();
        let subs = vec![
            sub(user, "YouTube", 250, "01-2025", None),
            sub(user, "YouTube", 250, "01-2025", None),
        ];
        let breakdown = cost_breakdown(&query(user, "YouTube", "01-2025", "02-2025"), &subs).unwrap();
        assert_eq!(breakdown.total, 500);
        assert_eq!(breakdown.months[0].subscription_id, Some(subs[0].id));
    }

    #[test]
    fn total_that_overflows_i64_is_rejected() {
        let user = Uuid::new_v4();
        let subs = vec![sub(user, "Premium", i64::MAX / 2 + 1, "01-2025", None)];

        let err = cost_breakdown(&query(user, "Premium", "01-2025", "02-2025"), &subs).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // A single month at the same price still fits.
        assert_eq!(
            total_cost(&query(user, "Premium", "01-2025", "01-2025"), &subs).unwrap(),
            i64::MAX / 2 + 1
        );
    }
}
