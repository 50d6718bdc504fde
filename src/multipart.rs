use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;

use reqwest::multipart::{Form, Part};
use tracing::trace;

use crate::error::{Error, Result};

/// Content type given to every file part
pub const PART_CONTENT_TYPE: &str = "application/octet-stream";

/// A named byte source for multipart uploads
///
/// The declared name becomes the part's `filename`. Path-backed sources are
/// opened only when the body is encoded.
pub struct FileSource {
    name: String,
    content: Content,
}

enum Content {
    Path(PathBuf),
    Bytes(Vec<u8>),
    Reader(Box<dyn Read + Send>),
}

impl FileSource {
    /// A file on disk, named after the path's final component
    pub fn path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        Self {
            name,
            content: Content::Path(path),
        }
    }

    /// In-memory content
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: Content::Bytes(bytes),
        }
    }

    /// Any reader; it is drained once, when the body is encoded
    pub fn from_reader<R>(name: impl Into<String>, reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            name: name.into(),
            content: Content::Reader(Box::new(reader)),
        }
    }

    /// Override the declared file name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The declared file name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drain the source into memory
    fn read_all(self) -> io::Result<(String, Vec<u8>)> {
        let data = match self.content {
            Content::Path(path) => std::fs::read(&path)
                .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))?,
            Content::Bytes(bytes) => bytes,
            Content::Reader(mut reader) => {
                let mut data = Vec::new();
                reader.read_to_end(&mut data)?;
                data
            }
        };
        Ok((self.name, data))
    }

    /// Read the source and turn it into a file part
    pub fn into_part(self, field: &str) -> Result<Part> {
        let (filename, data) = self.read_all().map_err(|e| {
            Error::encoding(format!("failed to read file for field '{}': {}", field, e))
        })?;
        trace!(field, filename = %filename, bytes = data.len(), "read multipart part");

        Part::bytes(data)
            .file_name(filename)
            .mime_str(PART_CONTENT_TYPE)
            .map_err(|e| Error::encoding(format!("Invalid content type: {}", e)))
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = match &self.content {
            Content::Path(path) => format!("Path({})", path.display()),
            Content::Bytes(bytes) => format!("Bytes({} bytes)", bytes.len()),
            Content::Reader(_) => "Reader".to_string(),
        };
        f.debug_struct("FileSource")
            .field("name", &self.name)
            .field("content", &content)
            .finish()
    }
}

/// Build a multipart form with one file part per entry.
///
/// Every source is read before the form is returned, so a failing source
/// leaves nothing to send.
pub fn build_form(files: BTreeMap<String, FileSource>) -> Result<Form> {
    let mut form = Form::new();
    for (field, source) in files {
        let part = source.into_part(&field)?;
        form = form.part(field, part);
    }
    Ok(form)
}

/// Value for the request's `Content-Type` header
pub fn content_type(form: &Form) -> String {
    format!("multipart/form-data; boundary={}", form.boundary())
}
