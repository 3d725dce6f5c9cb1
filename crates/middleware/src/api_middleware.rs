use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::{net::IpAddr, str::FromStr, time::Instant};
use tracing::{debug, error, info, warn};

/// Best-effort client address for access logs, `"unknown"` when none is found
pub fn extract_client_id(req: &Request<Body>) -> String {
    get_client_ip(req)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_ip(req: &Request<Body>, name: &str) -> Option<IpAddr> {
    let value = req.headers().get(name)?.to_str().ok()?;
    // X-Forwarded-For lists the originating client first
    let first = value.split(',').next()?;
    IpAddr::from_str(first.trim()).ok()
}

/// Proxy headers first, then the socket peer address
pub fn get_client_ip(req: &Request<Body>) -> Option<IpAddr> {
    header_ip(req, "X-Forwarded-For")
        .or_else(|| header_ip(req, "X-Real-IP"))
        .or_else(|| {
            req.extensions()
                .get::<axum::extract::connect_info::ConnectInfo<std::net::SocketAddr>>()
                .map(|connect_info| connect_info.ip())
        })
}

// Security headers middleware
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));

    response
}

/// Access log line per request with status and latency
pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let client = extract_client_id(&req);

    debug!(%method, %path, %client, "Request received");

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        error!(%method, %path, %client, status = status.as_u16(), elapsed_ms, "Request failed");
    } else if status.is_client_error() {
        warn!(%method, %path, %client, status = status.as_u16(), elapsed_ms, "Request rejected");
    } else {
        info!(%method, %path, %client, status = status.as_u16(), elapsed_ms, "Request served");
    }

    response
}
