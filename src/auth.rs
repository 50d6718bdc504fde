use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use http::HeaderValue;

use crate::error::Result;

/// Authentication scheme for a single call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Auth {
    /// No authentication
    #[default]
    None,
    /// Basic authentication
    Basic {
        username: String,
        password: String,
    },
    /// Bearer token authentication
    Bearer {
        token: String,
    },
}

impl Auth {
    /// Create a basic authentication scheme
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Create a bearer token authentication scheme
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer {
            token: token.into(),
        }
    }

    /// Check if authentication is configured
    pub fn is_some(&self) -> bool {
        !matches!(self, Auth::None)
    }

    /// Get the authorization header value
    pub fn authorization(&self) -> Option<String> {
        match self {
            Auth::None => None,
            Auth::Basic { username, password } => {
                let credentials = format!("{}:{}", username, password);
                Some(format!("Basic {}", BASE64.encode(credentials.as_bytes())))
            }
            Auth::Bearer { token } => Some(format!("Bearer {}", token)),
        }
    }

    /// Build the `Authorization` header, marked sensitive
    pub(crate) fn header_value(&self) -> Result<Option<HeaderValue>> {
        match self.authorization() {
            Some(value) => {
                let mut value = HeaderValue::from_str(&value)?;
                value.set_sensitive(true);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}
