//! Per-call request configuration.
//!
//! An [`Options`] value is folded from an ordered sequence of [`Opt`]
//! applicators, left to right, starting from [`Options::default`]. Scalar
//! settings (headers, auth, timeout, keep-alive flag, data, json) are
//! overwritten by later applicators; mapping settings (params, form, files)
//! are replaced wholesale, never merged.
//!
//! ```rust
//! use requests::{Opt, Options};
//! use std::time::Duration;
//!
//! let options: Options = [
//!     Opt::headers([("Accept", "application/json")]),
//!     Opt::basic_auth("alice", "secret"),
//!     Opt::timeout(Duration::from_secs(5)),
//! ]
//! .into_iter()
//! .collect();
//!
//! let same = Options::new()
//!     .headers([("Accept", "application/json")])
//!     .basic_auth("alice", "secret")
//!     .timeout(Duration::from_secs(5));
//!
//! assert_eq!(options.request_timeout(), same.request_timeout());
//! assert_eq!(options.authentication(), same.authentication());
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::auth::Auth;
use crate::multipart::FileSource;

/// A single setting-applicator
#[derive(Debug)]
pub enum Opt {
    /// Request headers, applied in order; names are case-insensitive
    Headers(Vec<(String, String)>),
    /// Query parameters
    Params(BTreeMap<String, String>),
    /// Authentication scheme
    Auth(Auth),
    /// Raw body, already stringified
    Data(String),
    /// URL-encoded form body
    Form(BTreeMap<String, String>),
    /// JSON body, or the error raised while serializing it
    Json(serde_json::Result<Value>),
    /// Multipart file uploads, keyed by form field name
    Files(BTreeMap<String, FileSource>),
    /// Overall request timeout
    Timeout(Duration),
    /// Do not reuse connections for this call
    DisableKeepAlives(bool),
}

impl Opt {
    pub fn headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Opt::Headers(pairs(headers).collect())
    }

    pub fn params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Opt::Params(pairs(params).collect())
    }

    pub fn auth(auth: Auth) -> Self {
        Opt::Auth(auth)
    }

    pub fn basic_auth(username: impl Into<String>, password: impl Into<String>) -> Self {
        Opt::Auth(Auth::basic(username, password))
    }

    pub fn bearer_auth(token: impl Into<String>) -> Self {
        Opt::Auth(Auth::bearer(token))
    }

    /// Raw body from any displayable value
    pub fn data(data: impl Display) -> Self {
        Opt::Data(data.to_string())
    }

    pub fn form<I, K, V>(form: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Opt::Form(pairs(form).collect())
    }

    /// JSON body from any serializable value.
    ///
    /// Serialization failures do not surface here; they are reported as an
    /// encoding error when the call is made.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        Opt::Json(serde_json::to_value(value))
    }

    pub fn files<I, K>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, FileSource)>,
        K: Into<String>,
    {
        Opt::Files(files.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn timeout(timeout: Duration) -> Self {
        Opt::Timeout(timeout)
    }

    pub fn disable_keep_alives(disable: bool) -> Self {
        Opt::DisableKeepAlives(disable)
    }
}

fn pairs<I, K, V>(iter: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    iter.into_iter().map(|(k, v)| (k.into(), v.into()))
}

/// Which payload a call will encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Data,
    Form,
    Json,
    Files,
}

/// A payload taken out of an [`Options`] for encoding
#[derive(Debug)]
pub enum Payload {
    Data(String),
    Form(BTreeMap<String, String>),
    Json(serde_json::Result<Value>),
    Files(BTreeMap<String, FileSource>),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Data(_) => PayloadKind::Data,
            Payload::Form(_) => PayloadKind::Form,
            Payload::Json(_) => PayloadKind::Json,
            Payload::Files(_) => PayloadKind::Files,
        }
    }
}

/// The merged, read-only configuration for one call
#[derive(Debug, Default)]
pub struct Options {
    headers: Vec<(String, String)>,
    params: BTreeMap<String, String>,
    auth: Auth,
    data: Option<String>,
    form: Option<BTreeMap<String, String>>,
    json: Option<serde_json::Result<Value>>,
    files: Option<BTreeMap<String, FileSource>>,
    timeout: Option<Duration>,
    disable_keep_alives: bool,
}

impl Options {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one setting on top of the current ones
    pub fn apply(mut self, opt: Opt) -> Self {
        match opt {
            Opt::Headers(headers) => self.headers = headers,
            Opt::Params(params) => self.params = params,
            Opt::Auth(auth) => self.auth = auth,
            Opt::Data(data) => self.data = Some(data),
            Opt::Form(form) => self.form = Some(form),
            Opt::Json(json) => self.json = Some(json),
            Opt::Files(files) => self.files = Some(files),
            Opt::Timeout(timeout) => self.timeout = Some(timeout),
            Opt::DisableKeepAlives(disable) => self.disable_keep_alives = disable,
        }
        self
    }

    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.apply(Opt::headers(headers))
    }

    pub fn params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.apply(Opt::params(params))
    }

    pub fn auth(self, auth: Auth) -> Self {
        self.apply(Opt::auth(auth))
    }

    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.apply(Opt::basic_auth(username, password))
    }

    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.apply(Opt::bearer_auth(token))
    }

    pub fn data(self, data: impl Display) -> Self {
        self.apply(Opt::data(data))
    }

    pub fn form<I, K, V>(self, form: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.apply(Opt::form(form))
    }

    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.apply(Opt::json(value))
    }

    pub fn files<I, K>(self, files: I) -> Self
    where
        I: IntoIterator<Item = (K, FileSource)>,
        K: Into<String>,
    {
        self.apply(Opt::files(files))
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        self.apply(Opt::timeout(timeout))
    }

    pub fn disable_keep_alives(self, disable: bool) -> Self {
        self.apply(Opt::disable_keep_alives(disable))
    }

    /// Header pairs in the order they will be written
    pub fn header_pairs(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn authentication(&self) -> &Auth {
        &self.auth
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn keep_alives_disabled(&self) -> bool {
        self.disable_keep_alives
    }

    /// The payload that would be encoded, by priority `data > form > json > files`
    pub fn payload_kind(&self) -> Option<PayloadKind> {
        if self.data.is_some() {
            Some(PayloadKind::Data)
        } else if self.form.is_some() {
            Some(PayloadKind::Form)
        } else if self.json.is_some() {
            Some(PayloadKind::Json)
        } else if self.files.is_some() {
            Some(PayloadKind::Files)
        } else {
            None
        }
    }

    /// Number of payload fields set, including ones that will be ignored
    pub fn payload_count(&self) -> usize {
        [
            self.data.is_some(),
            self.form.is_some(),
            self.json.is_some(),
            self.files.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    /// Remove the highest-priority payload; lower-priority ones are dropped
    pub(crate) fn take_payload(&mut self) -> Option<Payload> {
        let data = self.data.take();
        let form = self.form.take();
        let json = self.json.take();
        let files = self.files.take();

        data.map(Payload::Data)
            .or_else(|| form.map(Payload::Form))
            .or_else(|| json.map(Payload::Json))
            .or_else(|| files.map(Payload::Files))
    }
}

impl FromIterator<Opt> for Options {
    fn from_iter<I: IntoIterator<Item = Opt>>(iter: I) -> Self {
        iter.into_iter().fold(Options::default(), Options::apply)
    }
}

impl From<Vec<Opt>> for Options {
    fn from(opts: Vec<Opt>) -> Self {
        opts.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_options() {
        let options = Options::new();
        assert!(options.header_pairs().is_empty());
        assert!(options.query_params().is_empty());
        assert_eq!(options.authentication(), &Auth::None);
        assert_eq!(options.request_timeout(), None);
        assert!(!options.keep_alives_disabled());
        assert_eq!(options.payload_kind(), None);
    }

    #[test]
    fn test_later_scalars_override() {
        let options: Options = vec![
            Opt::basic_auth("alice", "secret"),
            Opt::timeout(Duration::from_secs(1)),
            Opt::headers([("X-One", "1")]),
            Opt::bearer_auth("token"),
            Opt::timeout(Duration::from_secs(9)),
            Opt::headers([("X-Two", "2")]),
            Opt::disable_keep_alives(true),
        ]
        .into();

        assert_eq!(options.authentication(), &Auth::bearer("token"));
        assert_eq!(options.request_timeout(), Some(Duration::from_secs(9)));
        assert_eq!(
            options.header_pairs(),
            &[("X-Two".to_string(), "2".to_string())]
        );
        assert!(options.keep_alives_disabled());
    }

    #[test]
    fn test_mappings_replace_not_merge() {
        let options = Options::new()
            .params([("a", "1"), ("b", "2")])
            .params([("c", "3")])
            .form([("x", "1")])
            .form([("y", "2")]);

        let params: Vec<_> = options.query_params().keys().cloned().collect();
        assert_eq!(params, vec!["c".to_string()]);

        let mut options = options;
        match options.take_payload() {
            Some(Payload::Form(form)) => {
                assert_eq!(form.len(), 1);
                assert_eq!(form.get("y").map(String::as_str), Some("2"));
            }
            other => panic!("expected form payload, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_application_matches_direct() {
        let sequence = || {
            vec![
                Opt::params([("q", "rust")]),
                Opt::timeout(Duration::from_secs(3)),
                Opt::params([("page", "2")]),
                Opt::basic_auth("a", "b"),
            ]
        };

        let folded: Options = sequence().into_iter().chain(sequence()).collect();
        let direct = Options::new()
            .params([("page", "2")])
            .timeout(Duration::from_secs(3))
            .basic_auth("a", "b");

        assert_eq!(folded.query_params(), direct.query_params());
        assert_eq!(folded.request_timeout(), direct.request_timeout());
        assert_eq!(folded.authentication(), direct.authentication());
    }

    #[test]
    fn test_payload_priority() {
        let options = Options::new()
            .files([("f", FileSource::from_bytes("a.txt", b"x".to_vec()))])
            .json(&serde_json::json!({"k": "v"}));
        assert_eq!(options.payload_kind(), Some(PayloadKind::Json));
        assert_eq!(options.payload_count(), 2);

        let options = options.form([("k", "v")]);
        assert_eq!(options.payload_kind(), Some(PayloadKind::Form));

        let mut options = options.data(42);
        assert_eq!(options.payload_kind(), Some(PayloadKind::Data));

        match options.take_payload() {
            Some(Payload::Data(data)) => assert_eq!(data, "42"),
            other => panic!("expected data payload, got {:?}", other),
        }
        assert_eq!(options.payload_kind(), None);
        assert_eq!(options.payload_count(), 0);
    }

    #[test]
    fn test_json_error_is_deferred() {
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not JSON object keys");

        let mut options = Options::new().json(&bad);
        assert_eq!(options.payload_kind(), Some(PayloadKind::Json));
        match options.take_payload() {
            Some(Payload::Json(result)) => assert!(result.is_err()),
            other => panic!("expected json payload, got {:?}", other),
        }
    }
}
