//! Proxy event envelopes
//!
//! The request/response JSON shapes a serverless HTTP gateway exchanges with a
//! function. Only the fields the resolver needs are read.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hyper::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::response::{AssetResponse, ResponseBody};

/// Inbound proxy event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    /// Request path; absent means `/`
    #[serde(default)]
    pub path: Option<String>,
    /// HTTP method; absent means GET
    #[serde(default)]
    pub http_method: Option<String>,
}

impl ProxyEvent {
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }

    /// Parsed method, `None` if the event carries an invalid token
    pub fn method(&self) -> Option<Method> {
        match self.http_method.as_deref() {
            None | Some("") => Some(Method::GET),
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok(),
        }
    }
}

/// Outbound proxy response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl From<AssetResponse> for ProxyResponse {
    fn from(resp: AssetResponse) -> Self {
        let is_base64_encoded = resp.is_base64_encoded();
        let body = match resp.body {
            ResponseBody::Binary(bytes) => STANDARD.encode(&bytes),
            ResponseBody::Text(text) => text,
            ResponseBody::Empty => String::new(),
        };
        Self {
            status_code: resp.status,
            headers: resp.headers,
            body,
            is_base64_encoded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::cache::CachePolicy;
    use hyper::body::Bytes;

    #[test]
    fn test_event_defaults() {
        let event: ProxyEvent = serde_json::from_str("{}").unwrap();
        assert_eq!(event.path(), "/");
        assert_eq!(event.method(), Some(Method::GET));
    }

    #[test]
    fn test_event_fields() {
        let event: ProxyEvent = serde_json::from_str(
            r#"{"path":"/app.js","httpMethod":"options","headers":{"Origin":"x"},"requestContext":{}}"#,
        )
        .unwrap();
        assert_eq!(event.path(), "/app.js");
        assert_eq!(event.method(), Some(Method::OPTIONS));

        let event = ProxyEvent {
            http_method: Some("GE T".to_string()),
            ..ProxyEvent::default()
        };
        assert_eq!(event.method(), None);
    }

    #[test]
    fn test_binary_body_is_base64() {
        let resp = ProxyResponse::from(AssetResponse::asset(
            Bytes::from_static(&[0, 1, 2, 255]),
            "image/png",
            CachePolicy::NoCache,
        ));
        assert!(resp.is_base64_encoded);
        assert_eq!(resp.body, "AAEC/w==");
        assert_eq!(STANDARD.decode(&resp.body).unwrap(), vec![0, 1, 2, 255]);
    }

    #[test]
    fn test_serialized_shape() {
        let resp = ProxyResponse::from(AssetResponse::not_found());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["body"], "Not Found");
        assert_eq!(json["isBase64Encoded"], false);
        assert_eq!(json["headers"]["Content-Type"], "text/plain");
        assert_eq!(json["headers"]["Access-Control-Allow-Origin"], "*");
    }
}
