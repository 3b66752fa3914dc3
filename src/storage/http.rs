//! S3-compatible object store over plain HTTP
//!
//! Issues anonymous path-style `GET {endpoint}/{bucket}/{key}` requests, which
//! works against public-read buckets and local S3 emulators. Status codes are
//! mapped to [`StoreError`] kinds. A 404 is only a missing object when the S3
//! error code says `NoSuchKey` (or there is no code); `NoSuchBucket` and other
//! codes are backend failures.

use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{ObjectStore, StoreError, StoredObject};
use crate::resolver::StorageKey;

/// Header some S3 implementations use to carry the error code
const AMZ_ERROR_CODE: &str = "x-amz-error-code";

/// Everything but RFC 3986 unreserved characters gets escaped inside a segment
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Clone)]
pub struct HttpStore {
    endpoint: String,
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl HttpStore {
    /// Create a store for an endpoint such as `http://127.0.0.1:9000`
    pub fn new(endpoint: &str) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the object URL, escaping each key segment
    pub fn object_uri(&self, bucket: &str, key: &StorageKey) -> Result<Uri, StoreError> {
        let encoded_key = key
            .as_str()
            .split('/')
            .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        let bucket = utf8_percent_encode(bucket, KEY_SEGMENT);
        format!("{}/{bucket}/{encoded_key}", self.endpoint)
            .parse()
            .map_err(|e| StoreError::Protocol(format!("invalid object URI: {e}")))
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    async fn get(&self, bucket: &str, key: &StorageKey) -> Result<StoredObject, StoreError> {
        let uri = self.object_uri(bucket, key)?;
        let request = Request::get(uri)
            .body(Empty::<Bytes>::new())
            .map_err(|e| StoreError::Protocol(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                let header_code = response
                    .headers()
                    .get(AMZ_ERROR_CODE)
                    .and_then(|v| v.to_str().ok())
                    .map(ToString::to_string);
                let code = match header_code {
                    Some(code) => Some(code),
                    None => {
                        let body = response
                            .into_body()
                            .collect()
                            .await
                            .map_err(|e| {
                                StoreError::Unavailable(format!("body read failed: {e}"))
                            })?
                            .to_bytes();
                        error_code_from_body(&body)
                    }
                };
                return Err(classify_missing(code.as_deref(), bucket, key));
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(StoreError::denied(bucket, key))
            }
            other => {
                return Err(StoreError::Protocol(format!(
                    "status {other} for {bucket}/{key}"
                )))
            }
        }

        let content_type_hint = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| StoreError::Unavailable(format!("body read failed: {e}")))?
            .to_bytes();

        Ok(StoredObject {
            bytes,
            content_type_hint,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Map the S3 error code of a 404 reply to a store error
fn classify_missing(code: Option<&str>, bucket: &str, key: &StorageKey) -> StoreError {
    match code {
        None | Some("NoSuchKey") => StoreError::not_found(bucket, key),
        Some("NoSuchBucket") => {
            StoreError::Unavailable(format!("bucket '{bucket}' does not exist"))
        }
        Some(other) => StoreError::Protocol(format!("404 {other} for {bucket}/{key}")),
    }
}

/// Pull the `<Code>` element out of an S3 XML error document
fn error_code_from_body(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?;
    let start = text.find("<Code>")? + "<Code>".len();
    let len = text[start..].find("</Code>")?;
    let code = text[start..start + len].trim();
    if code.is_empty() {
        return None;
    }
    Some(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{AssetRequest, Resolver};
    use crate::response::ResponseBody;
    use http_body_util::Full;
    use std::sync::Arc;
    use hyper::body::Incoming;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::Response;
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    fn s3_error(code: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Error><Code>{code}</Code><Message>m</Message></Error>"
        )
    }

    fn reply_xml(status: u16, body: String) -> Response<Full<Bytes>> {
        Response::builder()
            .status(status)
            .header("Content-Type", "application/xml")
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }

    fn reply(status: u16, body: &'static str) -> Response<Full<Bytes>> {
        Response::builder()
            .status(status)
            .header("Content-Type", "text/javascript")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    async fn route(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
        Ok(match req.uri().path() {
            "/bucket/app.js" => reply(200, "js"),
            "/bucket/my%20file.txt" => reply(200, "spaced"),
            "/bucket/private.txt" => reply(403, "AccessDenied"),
            "/bucket/broken.css" => reply(502, "Bad Gateway"),
            "/bucket/gone.js" => reply_xml(404, s3_error("NoSuchKey")),
            "/bucket/odd.js" => reply_xml(404, s3_error("NoSuchUpload")),
            "/bucket/header.js" => Response::builder()
                .status(404)
                .header("x-amz-error-code", "NoSuchBucket")
                .body(Full::new(Bytes::new()))
                .unwrap(),
            path if path.starts_with("/deleted-bucket/") => {
                reply_xml(404, s3_error("NoSuchBucket"))
            }
            _ => reply(404, "not here"),
        })
    }

    async fn spawn_origin() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service_fn(route))
                        .await;
                });
            }
        });
        addr
    }

    fn key(path: &str) -> StorageKey {
        StorageKey::from_path(path).unwrap()
    }

    #[test]
    fn test_object_uri_escapes_segments() {
        let store = HttpStore::new("http://localhost:9000/");
        let uri = store.object_uri("dev-ui", &key("/a b/c#d.js")).unwrap();
        assert_eq!(uri.to_string(), "http://localhost:9000/dev-ui/a%20b/c%23d.js");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let addr = spawn_origin().await;
        let store = HttpStore::new(&format!("http://{addr}"));

        let obj = store.get("bucket", &key("/app.js")).await.unwrap();
        assert_eq!(obj.bytes.as_ref(), b"js");
        assert_eq!(obj.content_type_hint.as_deref(), Some("text/javascript"));

        let obj = store.get("bucket", &key("/my file.txt")).await.unwrap();
        assert_eq!(obj.bytes.as_ref(), b"spaced");

        let err = store.get("bucket", &key("/missing.js")).await.unwrap_err();
        assert!(err.is_not_found());

        let err = store.get("bucket", &key("/private.txt")).await.unwrap_err();
        assert!(matches!(err, StoreError::Denied { .. }));

        let err = store.get("bucket", &key("/broken.css")).await.unwrap_err();
        assert!(matches!(err, StoreError::Protocol(_)));

        let err = store.get("bucket", &key("/gone.js")).await.unwrap_err();
        assert!(err.is_not_found(), "{err}");

        // A 404 for a missing bucket is an outage, not a missing object
        let err = store
            .get("deleted-bucket", &key("/app.js"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)), "{err}");

        let err = store.get("bucket", &key("/header.js")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)), "{err}");

        let err = store.get("bucket", &key("/odd.js")).await.unwrap_err();
        assert!(matches!(err, StoreError::Protocol(_)), "{err}");
    }

    #[test]
    fn test_error_code_from_body() {
        assert_eq!(
            error_code_from_body(s3_error("NoSuchBucket").as_bytes()).as_deref(),
            Some("NoSuchBucket")
        );
        assert_eq!(error_code_from_body(b"<Error><Code> </Code></Error>"), None);
        assert_eq!(error_code_from_body(b"not here"), None);
        assert_eq!(error_code_from_body(&[0xff, 0xfe]), None);
    }

    #[tokio::test]
    async fn test_missing_bucket_resolves_to_500() {
        let addr = spawn_origin().await;
        let store = Arc::new(HttpStore::new(&format!("http://{addr}")));
        let resolver = Resolver::new(store, "deleted-bucket");

        let resp = resolver.resolve(&AssetRequest::get("/app.js")).await;
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body, ResponseBody::Text("Internal Server Error".to_string()));

        // Deep links must not be masked by the fallback either
        let resp = resolver.resolve(&AssetRequest::get("/dashboard")).await;
        assert_eq!(resp.status, 500);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = HttpStore::new(&format!("http://{addr}"));
        let err = store.get("bucket", &key("/app.js")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)), "{err}");
    }
}
