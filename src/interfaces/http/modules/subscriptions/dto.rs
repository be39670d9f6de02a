//! Subscription DTOs
//!
//! Months travel as `MM-YYYY` strings. Field names are snake_case; the
//! camelCase spellings used by older clients are accepted as aliases.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    CostBreakdown, CostQuery, DomainResult, MonthRange, MonthlyCharge, Subscription,
    SubscriptionDraft,
};
use crate::shared::validations::{parse_id, parse_month, parse_optional_month};

/// Body of create and update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubscriptionRequest {
    #[serde(alias = "serviceName")]
    #[validate(length(min = 1, max = 255, message = "service name is required"))]
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    /// Monthly price in minor currency units
    #[validate(range(min = 0, message = "price must be non-negative"))]
    #[schema(example = 400)]
    pub price: i64,
    #[serde(alias = "userId")]
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    #[serde(alias = "startDate")]
    #[schema(example = "07-2025")]
    pub start_date: String,
    /// Omitted, null or "" for an open-ended subscription
    #[serde(default, alias = "endDate")]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

impl SubscriptionRequest {
    pub fn into_draft(self) -> DomainResult<SubscriptionDraft> {
        let user_id = parse_id("user_id", &self.user_id)?;
        let start = parse_month("start_date", &self.start_date)?;
        let end = parse_optional_month("end_date", self.end_date.as_deref())?;
        SubscriptionDraft::new(self.service_name, self.price, user_id, start, end)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    #[schema(example = "07-2025")]
    pub start_date: String,
    pub end_date: Option<String>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            service_name: s.service_name,
            price: s.price,
            user_id: s.user_id,
            start_date: s.start_month.to_wire(),
            end_date: s.end_month.map(|m| m.to_wire()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListParams {
    /// Only subscriptions starting strictly before this month (`MM-YYYY`)
    #[param(example = "09-2025")]
    pub point_of_reference: Option<String>,
}

/// Body of `POST /api/v1/cost`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CostRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "serviceName")]
    #[validate(length(min = 1, max = 255, message = "service name is required"))]
    pub service_name: String,
    /// First month of the period, inclusive
    #[serde(alias = "date_1")]
    #[schema(example = "01-2025")]
    pub from: String,
    /// Last month of the period, inclusive
    #[serde(alias = "date_2")]
    #[schema(example = "12-2025")]
    pub to: String,
}

impl CostRequest {
    pub fn into_query(self) -> DomainResult<CostQuery> {
        let user_id = parse_id("user_id", &self.user_id)?;
        let from = parse_month("from", &self.from)?;
        let to = parse_month("to", &self.to)?;
        Ok(CostQuery::new(user_id, self.service_name, MonthRange::new(from, to)?))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlyChargeDto {
    #[schema(example = "03-2025")]
    pub month: String,
    pub price: i64,
    /// Subscription the month was billed to; null when nothing was active
    pub subscription_id: Option<Uuid>,
}

impl From<MonthlyCharge> for MonthlyChargeDto {
    fn from(c: MonthlyCharge) -> Self {
        Self {
            month: c.month.to_wire(),
            price: c.price,
            subscription_id: c.subscription_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CostResponse {
    pub total_cost: i64,
    pub months: Vec<MonthlyChargeDto>,
}

impl From<CostBreakdown> for CostResponse {
    fn from(b: CostBreakdown) -> Self {
        Self {
            total_cost: b.total,
            months: b.months.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    fn request(end: Option<&str>) -> SubscriptionRequest {
        SubscriptionRequest {
            service_name: "Yandex Plus".into(),
            price: 400,
            user_id: "60601fee-2bf1-4721-ae6f-7636e79a0cba".into(),
            start_date: "07-2025".into(),
            end_date: end.map(String::from),
        }
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let req: SubscriptionRequest = serde_json::from_str(
            r#"{"serviceName":"Okko","price":1,"userId":"60601fee-2bf1-4721-ae6f-7636e79a0cba","startDate":"01-2025"}"#,
        )
        .unwrap();
        assert_eq!(req.service_name, "Okko");
        assert!(req.end_date.is_none());
    }

    #[test]
    fn blank_end_date_means_open_ended() {
        let draft = request(Some("")).into_draft().unwrap();
        assert_eq!(draft.end_month(), None);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = request(Some("06-2025")).into_draft().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn nil_user_id_is_rejected() {
        let mut req = request(None);
        req.user_id = Uuid::nil().to_string();
        assert!(matches!(req.into_draft(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn reversed_cost_range_is_rejected() {
        let req = CostRequest {
            user_id: Uuid::new_v4().to_string(),
            service_name: "Yandex Plus".into(),
            from: "05-2025".into(),
            to: "01-2025".into(),
        };
        assert!(matches!(req.into_query(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn response_uses_wire_months() {
        let draft = request(Some("12-2025")).into_draft().unwrap();
        let id = Uuid::new_v4();
        let resp = SubscriptionResponse::from(draft.into_subscription(id));
        assert_eq!(resp.id, id);
        assert_eq!(resp.start_date, "07-2025");
        assert_eq!(resp.end_date.as_deref(), Some("12-2025"));
    }
}
