//! Subscription aggregate
//!
//! Contains the Subscription entity, its repository contract and the monthly
//! cost aggregation.

pub mod cost;
pub mod model;
pub mod repository;

pub use cost::{cost_breakdown, total_cost, CostBreakdown, MonthlyCharge};
pub use model::{CostQuery, Subscription, SubscriptionDraft};
pub use repository::{SubscriptionRepository, LIST_PAGE_SIZE};
