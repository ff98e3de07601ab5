use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Tags every response with a request id and logs its outcome.
///
/// Must be layered outside the rate limiter so rejected requests are seen.
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            %request_id,
            client_ip = %addr.ip(),
            %method,
            %path,
            "Rate limited"
        );
    } else if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            %request_id,
            client_ip = %addr.ip(),
            %method,
            %path,
            %status,
            elapsed_ms,
            "Request failed"
        );
    } else {
        tracing::debug!(
            %request_id,
            client_ip = %addr.ip(),
            %method,
            %path,
            %status,
            elapsed_ms,
            "Request completed"
        );
    }

    response
}
