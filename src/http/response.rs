//! HTTP response building module
//!
//! Renders an [`AssetResponse`] as a hyper response for the HTTP transport.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::response::AssetResponse;

/// Build the hyper response for a descriptor
///
/// Bodies go out as raw bytes; base64 only matters to text transports.
/// For HEAD requests the body is dropped but Content-Length is kept.
pub fn build_response(resp: AssetResponse, is_head: bool) -> Response<Full<Bytes>> {
    let status = resp.status;
    let content_length = resp.body.len();
    let body = if is_head {
        Bytes::new()
    } else {
        resp.body.into_bytes()
    };

    let mut builder = Response::builder().status(status);
    for (name, value) in &resp.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if status != 204 {
        builder = builder.header("Content-Length", content_length);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(status, &e);
        let mut fallback = Response::new(Full::new(Bytes::from("Internal Server Error")));
        *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

/// Log response build error
fn log_build_error(status: u16, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
