//! requests - a small HTTP verb layer over reqwest
//!
//! Five entry points (`get`, `post`, `put`, `patch`, `delete`) configured with
//! an [`Options`] value instead of a long parameter list. Each call merges its
//! options into one outbound request, picks a body encoding, sends it, and
//! classifies the response by status code.
//!
//! ## Features
//!
//! - **Composable options**: headers, query params, auth, timeout, keep-alive
//! - **Four body encodings**: raw data, URL-encoded form, JSON, multipart files
//! - **Status classification**: anything outside [200, 226] is an error that
//!   still carries the response
//! - **Pluggable transport** and redirect policy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use requests::{Options, Opt};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let response = requests::get(
//!         "https://httpbin.org/get",
//!         Options::new().params([("q", "rust")]),
//!     )
//!     .await?;
//!     println!("Status: {}", response.status());
//!
//!     let options: Options = vec![
//!         Opt::basic_auth("alice", "secret"),
//!         Opt::form([("name", "requests")]),
//!     ]
//!     .into();
//!     let response = requests::post("https://httpbin.org/post", options).await?;
//!     println!("Body: {}", response.text().await?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every failure comes back as an [`Error`]; see [`ErrorKind`] for the
//! classes. For status failures the response is still available:
//!
//! ```rust,no_run
//! # async fn run() {
//! match requests::get("https://httpbin.org/status/404", requests::Options::new()).await {
//!     Ok(response) => println!("ok: {}", response.status()),
//!     Err(err) if err.is_status() => {
//!         let response = err.into_response().unwrap();
//!         println!("failed: {}", response.status_line());
//!     }
//!     Err(err) => println!("no response: {}", err),
//! }
//! # }
//! ```

pub mod auth;
pub mod body;
pub mod client;
pub mod error;
pub mod multipart;
pub mod options;
pub mod request;
pub mod response;
pub mod transport;

// Re-export main types for convenience
pub use auth::Auth;
pub use body::EncodedBody;
pub use client::{Client, ClientBuilder};
pub use error::{Error, ErrorKind, Result, StatusError};
pub use multipart::FileSource;
pub use options::{Opt, Options, PayloadKind};
pub use response::Response;
pub use transport::{HttpTransport, RedirectPolicy, SendOptions, Transport, TransportConfig};

// Re-export common HTTP types
pub use http::{HeaderMap, HeaderValue, Method, StatusCode};

// Re-export URL types
pub use url::Url;

/// Issue a GET request with a freshly built default client
pub async fn get(url: &str, options: Options) -> Result<Response> {
    Client::new()?.get(url, options).await
}

/// Issue a POST request with a freshly built default client
pub async fn post(url: &str, options: Options) -> Result<Response> {
    Client::new()?.post(url, options).await
}

/// Issue a PUT request with a freshly built default client
pub async fn put(url: &str, options: Options) -> Result<Response> {
    Client::new()?.put(url, options).await
}

/// Issue a PATCH request with a freshly built default client
pub async fn patch(url: &str, options: Options) -> Result<Response> {
    Client::new()?.patch(url, options).await
}

/// Issue a DELETE request with a freshly built default client
pub async fn delete(url: &str, options: Options) -> Result<Response> {
    Client::new()?.delete(url, options).await
}
