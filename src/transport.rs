use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use http::header::{HeaderValue, CONNECTION};
use reqwest::{Client as ReqwestClient, Request as ReqwestRequest, Response as ReqwestResponse};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Per-call transport tuning taken from the option set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Overall request timeout
    pub timeout: Option<Duration>,
    /// Close the connection after this call instead of pooling it
    pub disable_keep_alives: bool,
}

/// Transport trait for HTTP operations
///
/// Accepts a fully formed request and performs the round-trip. Connection
/// pooling, TLS, DNS, proxies and redirects all belong to the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response
    async fn send(&self, request: ReqwestRequest, options: &SendOptions) -> Result<ReqwestResponse>;
}

/// Decides whether to follow a redirect to `next`, given the URLs already visited
pub type RedirectPredicate = dyn Fn(&Url, &[Url]) -> bool + Send + Sync;

/// Redirect policy evaluated by the transport on each hop
#[derive(Clone, Default)]
pub enum RedirectPolicy {
    /// Whatever the transport does by default (reqwest follows up to 10 hops)
    #[default]
    Default,
    /// Never follow redirects
    None,
    /// Follow at most this many hops
    Limited(usize),
    /// Follow while the predicate returns true
    Custom(Arc<RedirectPredicate>),
}

impl RedirectPolicy {
    pub fn none() -> Self {
        RedirectPolicy::None
    }

    pub fn limited(max: usize) -> Self {
        RedirectPolicy::Limited(max)
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&Url, &[Url]) -> bool + Send + Sync + 'static,
    {
        RedirectPolicy::Custom(Arc::new(predicate))
    }

    fn to_reqwest(&self) -> reqwest::redirect::Policy {
        match self {
            RedirectPolicy::Default => reqwest::redirect::Policy::default(),
            RedirectPolicy::None => reqwest::redirect::Policy::none(),
            RedirectPolicy::Limited(max) => reqwest::redirect::Policy::limited(*max),
            RedirectPolicy::Custom(predicate) => {
                let predicate = Arc::clone(predicate);
                reqwest::redirect::Policy::custom(move |attempt| {
                    if predicate(attempt.url(), attempt.previous()) {
                        attempt.follow()
                    } else {
                        attempt.stop()
                    }
                })
            }
        }
    }
}

impl fmt::Debug for RedirectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectPolicy::Default => write!(f, "Default"),
            RedirectPolicy::None => write!(f, "None"),
            RedirectPolicy::Limited(max) => write!(f, "Limited({})", max),
            RedirectPolicy::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Transport configuration
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// TCP keep-alive interval
    pub tcp_keep_alive: Option<Duration>,
    /// How long idle pooled connections are kept
    pub pool_idle_timeout: Option<Duration>,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// `User-Agent` sent with every request
    pub user_agent: Option<String>,
    /// Redirect handling
    pub redirect: RedirectPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            tcp_keep_alive: Some(Duration::from_secs(30)),
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 100,
            user_agent: None,
            redirect: RedirectPolicy::default(),
        }
    }
}

/// Default HTTP transport implementation using reqwest
///
/// Sends through a pooled client. Calls that disable keep-alives go through a
/// second client that keeps no idle connections; it is built on first use.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    config: TransportConfig,
    pooled: ReqwestClient,
    unpooled: OnceLock<ReqwestClient>,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(config: &TransportConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            pooled: build_client(config, true)?,
            unpooled: OnceLock::new(),
        })
    }

    /// Get the underlying pooled reqwest client
    pub fn client(&self) -> &ReqwestClient {
        &self.pooled
    }

    fn unpooled(&self) -> Result<&ReqwestClient> {
        if let Some(client) = self.unpooled.get() {
            return Ok(client);
        }
        let client = build_client(&self.config, false)?;
        debug!("built client without connection reuse");
        Ok(self.unpooled.get_or_init(|| client))
    }
}

fn build_client(config: &TransportConfig, keep_alive: bool) -> Result<ReqwestClient> {
    let mut builder = ReqwestClient::builder()
        .connect_timeout(config.connect_timeout)
        .tcp_keepalive(config.tcp_keep_alive)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(if keep_alive { config.pool_max_idle_per_host } else { 0 })
        .redirect(config.redirect.to_reqwest());

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent.as_str());
    }

    builder.build().map_err(Error::Network)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, mut request: ReqwestRequest, options: &SendOptions) -> Result<ReqwestResponse> {
        if let Some(timeout) = options.timeout {
            *request.timeout_mut() = Some(timeout);
        }

        let client = if options.disable_keep_alives {
            request
                .headers_mut()
                .insert(CONNECTION, HeaderValue::from_static("close"));
            self.unpooled()?
        } else {
            &self.pooled
        };

        client.execute(request).await.map_err(Error::Network)
    }
}
