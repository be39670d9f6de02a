//! Subscription REST API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tokio_util::sync::CancellationToken;

use super::dto::{
    CostRequest, CostResponse, CreatedResponse, ListParams, SubscriptionRequest,
    SubscriptionResponse,
};
use crate::application::SubscriptionService;
use crate::domain::DomainError;
use crate::interfaces::http::common::{error_response, ApiError, ApiResponse, ValidatedJson};
use crate::shared::validations::{parse_id, parse_month};

#[derive(Clone)]
pub struct SubscriptionState {
    pub service: Arc<SubscriptionService>,
    /// Cancelled on shutdown; each cost query runs on a child of it
    pub shutdown: CancellationToken,
}

#[utoipa::path(
    post,
    path = "/api/v1/subs",
    tag = "Subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<CreatedResponse>),
        (status = 400, description = "Malformed JSON, id or month"),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn create_subscription(
    State(state): State<SubscriptionState>,
    ValidatedJson(req): ValidatedJson<SubscriptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ApiError> {
    let draft = req.into_draft().map_err(error_response)?;
    let id = state.service.create(draft).await.map_err(error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/subs/{id}",
    tag = "Subscriptions",
    params(("id" = String, Path, description = "Subscription UUID")),
    responses(
        (status = 200, description = "Subscription", body = ApiResponse<SubscriptionResponse>),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_subscription(
    State(state): State<SubscriptionState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SubscriptionResponse>>, ApiError> {
    let id = parse_id("id", &id).map_err(error_response)?;
    let sub = state.service.get(id).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(sub.into())))
}

/// Mounted on both POST and PUT.
#[utoipa::path(
    put,
    path = "/api/v1/subs/{id}",
    tag = "Subscriptions",
    params(("id" = String, Path, description = "Subscription UUID")),
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Updated subscription", body = ApiResponse<SubscriptionResponse>),
        (status = 400, description = "Malformed JSON, id or month"),
        (status = 404, description = "Not found"),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn update_subscription(
    State(state): State<SubscriptionState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<SubscriptionRequest>,
) -> Result<Json<ApiResponse<SubscriptionResponse>>, ApiError> {
    let id = parse_id("id", &id).map_err(error_response)?;
    let draft = req.into_draft().map_err(error_response)?;
    let updated = state.service.update(id, draft).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/subs/{id}",
    tag = "Subscriptions",
    params(("id" = String, Path, description = "Subscription UUID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_subscription(
    State(state): State<SubscriptionState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id("id", &id).map_err(error_response)?;
    state.service.delete(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/subs",
    tag = "Subscriptions",
    params(ListParams),
    responses(
        (status = 200, description = "Up to 10 subscriptions, latest start first", body = ApiResponse<Vec<SubscriptionResponse>>),
        (status = 400, description = "Missing or malformed point_of_reference")
    )
)]
pub async fn list_subscriptions(
    State(state): State<SubscriptionState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<SubscriptionResponse>>>, ApiError> {
    let raw = params
        .point_of_reference
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            error_response(DomainError::Validation(
                "missing point_of_reference query parameter".into(),
            ))
        })?;
    let cutoff = parse_month("point_of_reference", &raw).map_err(error_response)?;

    let page = state.service.list_before(cutoff).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(
        page.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/cost",
    tag = "Cost",
    request_body = CostRequest,
    responses(
        (status = 200, description = "Total and per-month charges", body = ApiResponse<CostResponse>),
        (status = 400, description = "Malformed input or reversed range"),
        (status = 503, description = "Query cancelled or timed out")
    )
)]
pub async fn total_cost(
    State(state): State<SubscriptionState>,
    ValidatedJson(req): ValidatedJson<CostRequest>,
) -> Result<Json<ApiResponse<CostResponse>>, ApiError> {
    let query = req.into_query().map_err(error_response)?;
    let cancel = state.shutdown.child_token();
    let breakdown = state
        .service
        .cost_breakdown(&query, &cancel)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(breakdown.into())))
}
