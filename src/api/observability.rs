use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::api::AppState;

/// `GET /metrics` in Prometheus text format.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

const fn outcome_for(status: u16) -> &'static str {
    if status >= 500 {
        "error"
    } else if status >= 400 {
        "client_error"
    } else {
        "success"
    }
}

/// Request span plus RED metrics. `user_id` is filled in by the auth layers.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %uri,
        route = route.clone(),
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // Raw paths carry emails and ids; label by route template only.
        let labels = [
            ("method", method),
            ("path", route.unwrap_or_else(|| "unmatched".to_string())),
            ("status", status.to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status,
            outcome = outcome_for(status),
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert("cache-control", HeaderValue::from_static("no-store"));

    response
}
