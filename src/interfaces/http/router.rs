//! API Router with Swagger UI

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::ApiResponse;
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::modules::subscriptions::{self, SubscriptionState};
use crate::application::SubscriptionService;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Subscription Ledger API",
        description = "Bookkeeping of recurring subscriptions and per-period cost reports"
    ),
    paths(
        health::health_check,
        subscriptions::create_subscription,
        subscriptions::get_subscription,
        subscriptions::update_subscription,
        subscriptions::delete_subscription,
        subscriptions::list_subscriptions,
        subscriptions::total_cost,
    ),
    components(
        schemas(
            ApiResponse<String>,
            subscriptions::SubscriptionRequest,
            subscriptions::SubscriptionResponse,
            subscriptions::CreatedResponse,
            subscriptions::CostRequest,
            subscriptions::CostResponse,
            subscriptions::MonthlyChargeDto,
            health::HealthResponse,
            health::StorageHealth,
        )
    ),
    tags(
        (name = "Subscriptions", description = "Subscription records"),
        (name = "Cost", description = "Spend over a period of months"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Everything the router needs from the running process.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<SubscriptionService>,
    pub health: HealthState,
    pub metrics: PrometheusHandle,
    /// Root token cancelled on shutdown
    pub shutdown: CancellationToken,
}

pub fn create_api_router(state: ApiState) -> Router {
    let subscription_state = SubscriptionState {
        service: state.service,
        shutdown: state.shutdown,
    };

    let api_routes = Router::new()
        .route(
            "/subs",
            post(subscriptions::create_subscription).get(subscriptions::list_subscriptions),
        )
        .route(
            "/subs/{id}",
            get(subscriptions::get_subscription)
                .post(subscriptions::update_subscription)
                .put(subscriptions::update_subscription)
                .delete(subscriptions::delete_subscription),
        )
        .route("/cost", post(subscriptions::total_cost))
        .with_state(subscription_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(state.health);

    let metrics_routes = Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(MetricsState {
            handle: state.metrics,
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .route_layer(middleware::from_fn(http_metrics_middleware))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
