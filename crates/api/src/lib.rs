//! HTTP API server for the fulfillment ledger.
//!
//! Exposes inventory reservations, shipment tracking, returns, policies,
//! order lookups and operations tickets over REST, with bearer-token auth, structured logging
//! (tracing), request ids, and Prometheus metrics.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod seed;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use ledger_store::LedgerStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use middleware::ApiKey;
use routes::metrics::MetricsState;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// `/health` and `/metrics` are public; everything else requires the API key.
pub fn create_app<S: LedgerStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    api_key: ApiKey,
) -> Router {
    let public = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .with_state(MetricsState::new(metrics_handle));

    let protected = Router::new()
        .route("/inventory", get(routes::inventory::list::<S>))
        .route("/inventory/reserve", post(routes::inventory::reserve::<S>))
        .route("/inventory/release", post(routes::inventory::release::<S>))
        .route("/inventory/{sku}", get(routes::inventory::get::<S>))
        .route("/inventory/{sku}/audit", get(routes::inventory::audit::<S>))
        .route(
            "/shipments/by-tracking/{tracking_id}",
            get(routes::shipments::by_tracking::<S>),
        )
        .route(
            "/shipments/by-order/{order_id}",
            get(routes::shipments::by_order::<S>),
        )
        .route(
            "/shipments/{id}/events",
            post(routes::shipments::record_event::<S>),
        )
        .route(
            "/shipments/{id}/simulate",
            post(routes::shipments::record_event::<S>),
        )
        .route("/returns", post(routes::returns::create::<S>))
        .route("/returns/{id}", get(routes::returns::get::<S>))
        .route("/returns/{id}/approve", post(routes::returns::approve::<S>))
        .route("/returns/{id}/receive", post(routes::returns::receive::<S>))
        .route("/returns/{id}/refund", post(routes::returns::refund::<S>))
        .route("/policies", get(routes::policies::get::<S>))
        .route("/tickets", post(routes::tickets::create::<S>))
        .route("/tickets/{id}", get(routes::tickets::get::<S>))
        .route("/customers", get(routes::customers::by_email::<S>))
        .route("/customers/{id}", get(routes::customers::get::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/notes", post(routes::orders::add_note::<S>))
        .route(
            "/orders/{id}/return-window",
            get(routes::orders::return_window::<S>),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            api_key,
            middleware::require_api_key,
        ))
        .with_state(state);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    public
        .merge(protected)
        .layer(axum::middleware::from_fn(middleware::track_requests))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(trace)
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

/// Creates the application state with every service sharing one store.
pub fn create_default_state<S: LedgerStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}
