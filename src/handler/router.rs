//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health probes first, then asset
//! resolution, then access logging.

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::resolver::AssetRequest;
use crate::response::AssetResponse;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{REFERER, USER_AGENT};
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let is_head = method == Method::HEAD;
    let raw_path = req.uri().path().to_string();

    let response = route_request(&state, &method, &raw_path).await;

    if state.config.logging.access_log {
        let mut entry =
            AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), raw_path);
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status;
        entry.body_bytes = if is_head { 0 } else { response.body.len() };
        entry.referer = header_string(&req, REFERER);
        entry.user_agent = header_string(&req, USER_AGENT);
        entry.elapsed = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(http::build_response(response, is_head))
}

/// Route request to health probes or the resolver
async fn route_request(state: &AppState, method: &Method, raw_path: &str) -> AssetResponse {
    let health = &state.config.health;
    if health.enabled
        && matches!(*method, Method::GET | Method::HEAD)
        && (raw_path == health.liveness_path || raw_path == health.readiness_path)
    {
        return AssetResponse::health("ok");
    }

    // Storage keys are raw object names, so undo the URI encoding first
    let Ok(path) = percent_decode_str(raw_path).decode_utf8() else {
        logger::log_warning(&format!("Request path is not valid UTF-8: {raw_path}"));
        return AssetResponse::bad_request();
    };

    state
        .resolver
        .resolve(&AssetRequest::new(method.clone(), path.into_owned()))
        .await
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
