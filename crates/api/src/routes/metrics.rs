//! Prometheus metrics endpoint.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Recorder handle plus the process start time for the uptime gauge.
#[derive(Clone)]
pub struct MetricsState {
    handle: PrometheusHandle,
    started_at: Instant,
}

impl MetricsState {
    pub fn new(handle: PrometheusHandle) -> Self {
        Self {
            handle,
            started_at: Instant::now(),
        }
    }
}

/// GET /metrics: Prometheus text exposition, no authentication.
pub async fn get(State(state): State<MetricsState>) -> impl IntoResponse {
    metrics::gauge!("process_uptime_seconds").set(state.started_at.elapsed().as_secs_f64());

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.handle.render(),
    )
}
