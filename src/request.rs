//! Request dispatch: query merge, request construction and the round-trip.

use std::collections::BTreeMap;

use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use http::Method;
use reqwest::{Client as ReqwestClient, Request as ReqwestRequest, RequestBuilder};
use tracing::debug;
use url::Url;

use crate::body::{BodyContent, EncodedBody};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::response::Response;
use crate::transport::{SendOptions, Transport};

/// Append `params` to `url` as a query string.
///
/// A URL that already has a `?` cannot take params as well; the two would
/// have to be merged, which is left to the caller.
pub fn merge_query(url: &str, params: &BTreeMap<String, String>) -> Result<String> {
    if params.is_empty() {
        return Ok(url.to_string());
    }
    if url.contains('?') {
        return Err(Error::config(format!(
            "ambiguous query string: params given but url already contains '?': {}",
            url
        )));
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    Ok(format!("{}?{}", url, query))
}

/// Build the outbound request.
///
/// Header precedence, lowest first: option headers, the encoder's content
/// type, the authentication header. `assembler` is only used to attach a
/// multipart form; it never sends anything.
pub fn build_request(
    assembler: &ReqwestClient,
    method: Method,
    url: &str,
    options: &Options,
    body: Option<EncodedBody>,
) -> Result<ReqwestRequest> {
    let url = Url::parse(url)?;
    let mut request = ReqwestRequest::new(method, url);

    for (name, value) in options.header_pairs() {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        request.headers_mut().insert(name, value);
    }

    if let Some(body) = body {
        let (content, content_type) = body.into_parts();
        request = match content {
            BodyContent::Bytes(bytes) => {
                *request.body_mut() = Some(bytes.into());
                request
            }
            BodyContent::Multipart(form) => {
                // reqwest appends these, so clear the caller's first
                request.headers_mut().remove(CONTENT_TYPE);
                request.headers_mut().remove(CONTENT_LENGTH);
                RequestBuilder::from_parts(assembler.clone(), request)
                    .multipart(form)
                    .build()?
            }
        };
        if let Some(content_type) = content_type {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
        }
    }

    if let Some(authorization) = options.authentication().header_value()? {
        request.headers_mut().insert(AUTHORIZATION, authorization);
    }

    Ok(request)
}

/// Send one request through `transport` and classify the response
pub async fn dispatch(
    transport: &dyn Transport,
    assembler: &ReqwestClient,
    method: Method,
    url: &str,
    options: Options,
    body: Option<EncodedBody>,
) -> Result<Response> {
    let request = build_request(assembler, method, url, &options, body)?;
    let send_options = SendOptions {
        timeout: options.request_timeout(),
        disable_keep_alives: options.keep_alives_disabled(),
    };

    debug!(method = %request.method(), url = %request.url(), "sending request");
    let raw = transport.send(request, &send_options).await?;

    let response = Response::from_reqwest_response(raw);
    debug!(status = %response.status(), url = %response.url(), "received response");
    response.classify()
}
