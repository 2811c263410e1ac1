
use axum::extract::{MatchedPath, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramVec, IntCounterVec, Registry, TextEncoder};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::error;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}
static REQ_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static REQ_DURATION: OnceLock<HistogramVec> = OnceLock::new();

/// Register the collectors. Safe to call more than once.
pub fn init_metrics() {
    let req_counter = REQ_COUNTER.get_or_init(|| {
        IntCounterVec::new(
            prometheus::opts!("requests_total", "Total requests per route"),
            &["route", "status"],
        )
        .expect("static metric definition")
    });

    let req_duration = REQ_DURATION.get_or_init(|| {
        HistogramVec::new(
            prometheus::HistogramOpts::new(
                "request_duration_seconds",
                "Time spent handling a request",
            ),
            &["route"],
        )
        .expect("static metric definition")
    });

    REGISTRY.register(Box::new(req_counter.clone())).ok();
    REGISTRY.register(Box::new(req_duration.clone())).ok();
}

pub fn inc_request(route: &str, status: &str) {
    if let Some(counter) = REQ_COUNTER.get() {
        counter.with_label_values(&[route, status]).inc();
    }
}

pub fn observe_duration(route: &str, seconds: f64) {
    if let Some(histogram) = REQ_DURATION.get() {
        histogram.with_label_values(&[route]).observe(seconds);
    }
}

/// Middleware recording count and latency per matched route template, so
/// `/journals/delete/:id` is one series rather than one per id. Requests
/// that hit no route are counted under `unmatched`.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let started = Instant::now();
    let response = next.run(request).await;

    inc_request(&route, response.status().as_str());
    observe_duration(&route, started.elapsed().as_secs_f64());
    response
}

pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
        .into_response()
}
