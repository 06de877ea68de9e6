//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Registers help text for the booking metrics. Call once after the
/// recorder is installed.
pub fn describe() {
    metrics::describe_counter!("order_attempts_total", "Order placements started");
    metrics::describe_counter!("orders_placed_total", "Orders committed with every seat reserved");
    metrics::describe_counter!(
        "orders_rejected_total",
        "Orders that ended without a record, by error kind"
    );
    metrics::describe_counter!(
        "reservation_compensations_total",
        "Order attempts whose reservations were rolled back"
    );
    metrics::describe_counter!(
        "compensation_failures_total",
        "Restoring increments that failed and left seats taken"
    );
    metrics::describe_counter!("seat_decrements_total", "Guarded seat decrements by outcome");
    metrics::describe_histogram!(
        "order_workflow_duration_seconds",
        metrics::Unit::Seconds,
        "Time to place or reject an order"
    );
}

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
