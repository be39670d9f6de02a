pub mod month;
pub mod repositories;
pub mod subscription;

// Re-export commonly used types
pub use month::{Month, MonthRange};
pub use repositories::{DomainError, DomainResult, RepositoryProvider};
pub use subscription::{
    CostBreakdown, CostQuery, MonthlyCharge, Subscription, SubscriptionDraft,
    SubscriptionRepository, LIST_PAGE_SIZE,
};
