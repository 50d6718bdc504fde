use std::sync::Arc;
use std::time::Duration;

use http::Method;
use reqwest::Client as ReqwestClient;
use tracing::debug;

use crate::body::{self, EncodedBody};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::request::{dispatch, merge_query};
use crate::response::Response;
use crate::transport::{HttpTransport, RedirectPolicy, Transport, TransportConfig};

/// HTTP client holding one transport
///
/// Cloning is cheap and clones share the transport, and with it reqwest's
/// connection pool. Nothing else is shared between calls.
///
/// # Examples
///
/// ```rust,no_run
/// use requests::{Client, Options};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new()?;
///     let options = Options::new().json(&serde_json::json!({"name": "requests"}));
///     let response = client.post("https://httpbin.org/post", options).await?;
///     println!("Status: {}", response.status());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    // only assembles multipart requests; sending goes through `transport`
    assembler: ReqwestClient,
}

impl Client {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a new client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Issue a GET request; payload options are ignored
    pub async fn get(&self, url: &str, options: Options) -> Result<Response> {
        self.request(Method::GET, url, options).await
    }

    /// Issue a POST request
    pub async fn post(&self, url: &str, options: Options) -> Result<Response> {
        self.request(Method::POST, url, options).await
    }

    /// Issue a PUT request
    pub async fn put(&self, url: &str, options: Options) -> Result<Response> {
        self.request(Method::PUT, url, options).await
    }

    /// Issue a PATCH request
    pub async fn patch(&self, url: &str, options: Options) -> Result<Response> {
        self.request(Method::PATCH, url, options).await
    }

    /// Issue a DELETE request
    pub async fn delete(&self, url: &str, options: Options) -> Result<Response> {
        self.request(Method::DELETE, url, options).await
    }

    /// Issue a request with any method.
    ///
    /// GET and HEAD never carry a body. Other methods encode the first
    /// payload set, in priority order `data > form > json > files`.
    pub async fn request(&self, method: Method, url: &str, mut options: Options) -> Result<Response> {
        let url = merge_query(url, options.query_params())?;
        let body = if carries_body(&method) {
            select_body(&mut options)?
        } else {
            None
        };

        dispatch(self.transport.as_ref(), &self.assembler, method, &url, options, body).await
    }
}

fn carries_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}

fn select_body(options: &mut Options) -> Result<Option<EncodedBody>> {
    if options.payload_count() > 1 {
        debug!(
            used = ?options.payload_kind(),
            set = options.payload_count(),
            "several payloads set, lower-priority ones are ignored"
        );
    }
    options.take_payload().map(body::encode).transpose()
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

/// Builder for creating HTTP clients with custom configuration
///
/// # Examples
///
/// ```rust
/// use requests::{ClientBuilder, RedirectPolicy};
/// use std::time::Duration;
///
/// let client = ClientBuilder::new()
///     .connect_timeout(Duration::from_secs(5))
///     .user_agent("MyApp/1.0")
///     .redirect(RedirectPolicy::none())
///     .build()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    config: TransportConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the TCP keep-alive interval
    pub fn tcp_keep_alive(mut self, interval: Option<Duration>) -> Self {
        self.config.tcp_keep_alive = interval;
        self
    }

    /// Set the pool idle timeout
    pub fn pool_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set the maximum number of idle connections per host
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Set the redirect policy
    pub fn redirect(mut self, policy: RedirectPolicy) -> Self {
        self.config.redirect = policy;
        self
    }

    /// Replace the whole transport configuration
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom transport; the transport configuration is then unused
    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<Client> {
        let (transport, assembler): (Arc<dyn Transport>, ReqwestClient) = match self.transport {
            Some(transport) => {
                let assembler = ReqwestClient::builder().build().map_err(Error::Network)?;
                (transport, assembler)
            }
            None => {
                let http = HttpTransport::new(&self.config)?;
                let assembler = http.client().clone();
                (Arc::new(http), assembler)
            }
        };
        Ok(Client {
            transport,
            assembler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::Request as ReqwestRequest;

    use crate::multipart::FileSource;
    use crate::transport::SendOptions;

    /// Captures the last request and answers 200
    #[derive(Default)]
    struct CaptureTransport {
        last: Mutex<Option<(Method, String, Option<String>, Option<Vec<u8>>)>>,
    }

    #[async_trait]
    impl Transport for CaptureTransport {
        async fn send(&self, request: ReqwestRequest, _: &SendOptions) -> Result<reqwest::Response> {
            let content_type = request
                .headers()
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = request.body().and_then(|b| b.as_bytes()).map(<[u8]>::to_vec);
            *self.last.lock().unwrap() = Some((
                request.method().clone(),
                request.url().to_string(),
                content_type,
                body,
            ));
            Ok(reqwest::Response::from(http::Response::new("")))
        }
    }

    fn client() -> (Client, Arc<CaptureTransport>) {
        let transport = Arc::new(CaptureTransport::default());
        let client = Client {
            transport: transport.clone(),
            assembler: ReqwestClient::new(),
        };
        (client, transport)
    }

    #[test]
    fn test_client_builder() {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(5))
            .user_agent("Test/1.0")
            .pool_max_idle_per_host(4)
            .build();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_get_never_sends_body() {
        let (client, transport) = client();
        let options = Options::new().json(&serde_json::json!({"ignored": true}));
        client.get("http://localhost/items", options).await.unwrap();

        let (method, _, content_type, body) = transport.last.lock().unwrap().take().unwrap();
        assert_eq!(method, Method::GET);
        assert_eq!(content_type, None);
        assert_eq!(body, None);
    }

    #[tokio::test]
    async fn test_post_prefers_form_over_json() {
        let (client, transport) = client();
        let options = Options::new()
            .json(&serde_json::json!({"a": 1}))
            .form([("a", "1")]);
        client.post("http://localhost/items", options).await.unwrap();

        let (_, _, content_type, body) = transport.last.lock().unwrap().take().unwrap();
        assert_eq!(content_type.as_deref(), Some("application/x-www-form-urlencoded"));
        assert_eq!(body.as_deref(), Some(&b"a=1"[..]));
    }

    #[tokio::test]
    async fn test_every_body_method_encodes_files() {
        let (client, transport) = client();
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let options = Options::new()
                .files([("doc", FileSource::from_bytes("doc.txt", b"hi".to_vec()))]);
            client.request(method.clone(), "http://localhost/up", options).await.unwrap();

            let (seen, _, content_type, _) = transport.last.lock().unwrap().take().unwrap();
            assert_eq!(seen, method);
            assert!(content_type.unwrap().starts_with("multipart/form-data; boundary="));
        }
    }

    #[tokio::test]
    async fn test_params_are_appended() {
        let (client, transport) = client();
        let options = Options::new().params([("page", "2"), ("q", "a b")]);
        client.delete("http://localhost/items", options).await.unwrap();

        let (_, url, _, body) = transport.last.lock().unwrap().take().unwrap();
        assert_eq!(url, "http://localhost/items?page=2&q=a+b");
        assert_eq!(body, None);
    }

    #[tokio::test]
    async fn test_query_conflict_fails_before_transport() {
        let (client, transport) = client();
        let options = Options::new().params([("page", "2")]);
        let err = client.put("http://localhost/items?x=1", options).await.unwrap_err();

        assert!(err.is_config());
        assert!(transport.last.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_failure_fails_before_transport() {
        let (client, transport) = client();
        let mut bad = std::collections::HashMap::new();
        bad.insert((1, 2), 3);
        let err = client
            .patch("http://localhost/items", Options::new().json(&bad))
            .await
            .unwrap_err();

        assert!(err.is_encoding());
        assert!(transport.last.lock().unwrap().is_none());
    }
}
