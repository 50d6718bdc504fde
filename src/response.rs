use reqwest::{Response as ReqwestResponse, StatusCode};
use http::{HeaderMap, HeaderValue};

use crate::error::{Error, Result, StatusError};

/// Lowest status code classified as success
const SUCCESS_MIN: u16 = 200;
/// Highest status code classified as success (226 IM Used)
const SUCCESS_MAX: u16 = 226;

/// Whether `status` falls in the success range [200, 226]
pub fn is_success_status(status: StatusCode) -> bool {
    (SUCCESS_MIN..=SUCCESS_MAX).contains(&status.as_u16())
}

/// HTTP response representation
///
/// Owns the raw transport response. Status, headers, URL and version are
/// available immediately; the body is only read when one of the body
/// accessors consumes the response.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: url::Url,
    version: http::Version,
    inner: ReqwestResponse,
}

impl Response {
    /// Create a response from a reqwest response
    pub fn from_reqwest_response(reqwest_response: ReqwestResponse) -> Self {
        let status = reqwest_response.status();
        let headers = reqwest_response.headers().clone();
        let url = reqwest_response.url().clone();
        let version = reqwest_response.version();

        Self {
            status,
            headers,
            url,
            version,
            inner: reqwest_response,
        }
    }

    /// Classify by status code, turning anything outside [200, 226] into a
    /// status error that still owns the response
    pub(crate) fn classify(self) -> Result<Self> {
        if is_success_status(self.status) {
            Ok(self)
        } else {
            Err(Error::from(StatusError::new(self)))
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the status line, e.g. `200 OK` or `404 Not Found`
    pub fn status_line(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {}", self.status.as_u16(), reason),
            None => self.status.as_u16().to_string(),
        }
    }

    /// Get the HTTP version
    pub fn version(&self) -> http::Version {
        self.version
    }

    /// Get the response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// Get the content type
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Get the content length
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(http::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
    }

    /// Get the final URL, after any redirects the transport followed
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Check if the status is in the success range [200, 226]
    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }

    /// Get the response body as text
    pub async fn text(self) -> Result<String> {
        self.inner
            .text()
            .await
            .map_err(Error::Network)
    }

    /// Get the response body as bytes
    pub async fn bytes(self) -> Result<Vec<u8>> {
        self.inner
            .bytes()
            .await
            .map_err(Error::Network)
            .map(|b| b.to_vec())
    }

    /// Get the response body as JSON
    pub async fn json<T>(self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::response_parse(format!("invalid JSON body: {}", e)))
    }

    /// Copy the response body to a writer
    pub async fn copy_to<W>(self, writer: &mut W) -> Result<u64>
    where
        W: tokio::io::AsyncWrite + Unpin,
    {
        use tokio::io::AsyncWriteExt;

        let bytes = self.bytes().await?;
        writer
            .write_all(&bytes)
            .await
            .map_err(|e| Error::response_parse(format!("failed to copy body: {}", e)))?;
        Ok(bytes.len() as u64)
    }

    /// Get the underlying reqwest response
    pub fn into_inner(self) -> ReqwestResponse {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> Response {
        with_body(status, r#"{"message": "Hello, World!"}"#)
    }

    fn with_body(status: u16, body: &'static str) -> Response {
        let raw = http::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .header("x-request-id", "42")
            .body(body)
            .unwrap();
        Response::from_reqwest_response(ReqwestResponse::from(raw))
    }

    #[test]
    fn test_success_range() {
        for code in [200, 201, 204, 226] {
            assert!(is_success_status(StatusCode::from_u16(code).unwrap()), "{}", code);
        }
        for code in [100, 199, 227, 301, 304, 404, 500] {
            assert!(!is_success_status(StatusCode::from_u16(code).unwrap()), "{}", code);
        }
    }

    #[test]
    fn test_classify_created() {
        let response = response(201).classify().unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.content_type(), Some("application/json"));
    }

    #[test]
    fn test_classify_not_found_keeps_headers() {
        let err = response(404).classify().unwrap_err();
        assert!(err.is_status());
        assert_eq!(err.to_string(), "404 Not Found");

        let response = err.into_response().unwrap();
        assert_eq!(response.header("x-request-id").unwrap(), "42");
    }

    #[test]
    fn test_redirect_is_not_success() {
        let err = response(302).classify().unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FOUND));
    }

    #[test]
    fn test_status_line_without_reason() {
        assert_eq!(response(599).status_line(), "599");
    }

    #[tokio::test]
    async fn test_body_is_readable_after_status_error() {
        let err = response(500).classify().unwrap_err();
        let body: serde_json::Value = err.into_response().unwrap().json().await.unwrap();
        assert_eq!(body["message"], "Hello, World!");
    }

    #[tokio::test]
    async fn test_malformed_json_is_not_encoding_error() {
        let err = with_body(200, "not json")
            .json::<serde_json::Value>()
            .await
            .unwrap_err();

        assert!(err.is_response_parse());
        assert!(!err.is_encoding());
        assert!(err.to_string().contains("invalid JSON body"));
    }

    #[tokio::test]
    async fn test_copy_to_failure_is_response_parse() {
        struct Closed;

        impl tokio::io::AsyncWrite for Closed {
            fn poll_write(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
                _: &[u8],
            ) -> std::task::Poll<std::io::Result<usize>> {
                std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
            }

            fn poll_flush(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }

            fn poll_shutdown(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }
        }

        let err = response(200).copy_to(&mut Closed).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Response);

        let mut sink = Vec::new();
        let copied = response(200).copy_to(&mut sink).await.unwrap();
        assert_eq!(copied, sink.len() as u64);
    }
}
