//! Body encoders: one strategy per payload kind.

use std::collections::BTreeMap;

use reqwest::multipart::Form;
use serde_json::Value;
use tracing::trace;

use crate::error::Result;
use crate::multipart::{self, FileSource};
use crate::options::Payload;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// What an encoder produced
#[derive(Debug)]
pub enum BodyContent {
    /// A complete in-memory body
    Bytes(Vec<u8>),
    /// A multipart form whose sources have all been read
    Multipart(Form),
}

/// An encoded request body, consumed once by the dispatcher
#[derive(Debug)]
pub struct EncodedBody {
    content: BodyContent,
    content_type: Option<String>,
}

impl EncodedBody {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            content: BodyContent::Bytes(bytes),
            content_type,
        }
    }

    /// Wrap a multipart form; the content type carries its boundary
    pub fn multipart(form: Form) -> Self {
        let content_type = multipart::content_type(&form);
        Self {
            content: BodyContent::Multipart(form),
            content_type: Some(content_type),
        }
    }

    /// The body bytes, unless the body is a multipart form
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.content {
            BodyContent::Bytes(bytes) => Some(bytes),
            BodyContent::Multipart(_) => None,
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.content, BodyContent::Multipart(_))
    }

    /// Content type set by the encoder, if it sets one
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn into_parts(self) -> (BodyContent, Option<String>) {
        (self.content, self.content_type)
    }
}

/// Encode a payload with its matching strategy
pub fn encode(payload: Payload) -> Result<EncodedBody> {
    trace!(kind = ?payload.kind(), "encoding request body");
    match payload {
        Payload::Data(data) => Ok(encode_data(data)),
        Payload::Form(form) => Ok(encode_form(&form)),
        Payload::Json(json) => encode_json(json?),
        Payload::Files(files) => encode_files(files),
    }
}

/// Raw body; the caller owns the content type
pub fn encode_data(data: String) -> EncodedBody {
    EncodedBody::new(data.into_bytes(), None)
}

pub fn encode_form(form: &BTreeMap<String, String>) -> EncodedBody {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form)
        .finish();
    EncodedBody::new(encoded.into_bytes(), Some(FORM_CONTENT_TYPE.to_string()))
}

pub fn encode_json(value: Value) -> Result<EncodedBody> {
    let bytes = serde_json::to_vec(&value)?;
    Ok(EncodedBody::new(bytes, Some(JSON_CONTENT_TYPE.to_string())))
}

/// One multipart part per entry; any source failure aborts the whole body
pub fn encode_files(files: BTreeMap<String, FileSource>) -> Result<EncodedBody> {
    multipart::build_form(files).map(EncodedBody::multipart)
}
