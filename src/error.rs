use thiserror::Error;

use crate::response::Response;

/// Result type for requests operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for requests
#[derive(Error, Debug)]
pub enum Error {
    /// Contradictory or invalid caller input, detected before any network activity
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing errors
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Body encoding errors (multipart source failures)
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport failures: DNS, connect, TLS, timeout
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response arrived but its body could not be decoded or copied out
    #[error("Response parsing error: {0}")]
    ResponseParse(String),

    /// The round-trip succeeded but the status code is outside [200, 226]
    #[error(transparent)]
    Status(Box<StatusError>),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Encoding,
    Transport,
    Status,
    /// Reading the body of a response that was already received
    Response,
}

impl Error {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Create a new encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Error::Encoding(message.into())
    }

    /// Create a new response parsing error
    pub fn response_parse(message: impl Into<String>) -> Self {
        Error::ResponseParse(message.into())
    }

    /// Which part of the taxonomy this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) | Error::Url(_) => ErrorKind::Configuration,
            Error::Encoding(_) | Error::Json(_) => ErrorKind::Encoding,
            Error::Network(_) => ErrorKind::Transport,
            Error::Status(_) => ErrorKind::Status,
            Error::ResponseParse(_) => ErrorKind::Response,
        }
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Check if this is an encoding error
    pub fn is_encoding(&self) -> bool {
        self.kind() == ErrorKind::Encoding
    }

    /// Check if this is a transport error
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Check if this failed while reading a received response body
    pub fn is_response_parse(&self) -> bool {
        self.kind() == ErrorKind::Response
    }

    /// Check if this is a status error
    pub fn is_status(&self) -> bool {
        self.kind() == ErrorKind::Status
    }

    /// Get the underlying reqwest error if this is a transport error
    pub fn as_network_error(&self) -> Option<&reqwest::Error> {
        match self {
            Error::Network(e) => Some(e),
            _ => None,
        }
    }

    /// The response that accompanied a status error.
    ///
    /// Only [`Error::Status`] carries one; every other kind fails before a
    /// response exists.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Status(e) => Some(&e.response),
            _ => None,
        }
    }

    /// Take ownership of the response that accompanied a status error
    pub fn into_response(self) -> Option<Response> {
        match self {
            Error::Status(e) => Some(e.response),
            _ => None,
        }
    }

    /// Status code of a status error
    pub fn status(&self) -> Option<http::StatusCode> {
        self.response().map(Response::status)
    }
}

impl From<StatusError> for Error {
    fn from(err: StatusError) -> Self {
        Error::Status(Box::new(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Error::Config(format!("Invalid header name: {}", err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Error::Config(format!("Invalid header value: {}", err))
    }
}

/// A response whose status code was classified as a failure.
///
/// Displays as the status line (`404 Not Found`). The response is kept so
/// callers can still read headers and body.
#[derive(Error, Debug)]
#[error("{status_line}")]
pub struct StatusError {
    status_line: String,
    response: Response,
}

impl StatusError {
    pub(crate) fn new(response: Response) -> Self {
        Self {
            status_line: response.status_line(),
            response,
        }
    }

    /// Get the status code
    pub fn status(&self) -> http::StatusCode {
        self.response.status()
    }

    /// Get the status line, e.g. `404 Not Found`
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// Get the wrapped response
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Take the wrapped response
    pub fn into_response(self) -> Response {
        self.response
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}
