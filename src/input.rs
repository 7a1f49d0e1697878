/// Input collection: the selected file and the credentials that key an operation.
///
/// Nothing here validates. Emptiness is checked when an operation is
/// dispatched, so partial input is always accepted.
use std::path::Path;

use crate::error::Result;
use crate::sensitive::SensitiveString;

/// MIME type used when a file's type is unknown.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A file chosen for the next operation.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name sent as the multipart part's filename.
    pub name: String,
    /// Raw file content.
    pub data: Vec<u8>,
    /// MIME type of the content, if known.
    pub mime_type: Option<String>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk. The name is the final path component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self::new(name, data).with_mime_type(OCTET_STREAM))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(OCTET_STREAM)
    }
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size", &self.data.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Identity and secret keyword sent with every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub identity: String,
    pub keyword: SensitiveString,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, keyword: impl Into<SensitiveString>) -> Self {
        Self {
            identity: identity.into(),
            keyword: keyword.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.identity.is_empty() && !self.keyword.is_empty()
    }
}

/// Holds the current file selection and credentials for a session.
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    file: Option<SelectedFile>,
    credentials: Credentials,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection unconditionally.
    pub fn set_file(&mut self, file: SelectedFile) {
        self.file = Some(file);
    }

    pub fn set_identity(&mut self, identity: impl Into<String>) {
        self.credentials.identity = identity.into();
    }

    pub fn set_keyword(&mut self, keyword: impl Into<SensitiveString>) {
        self.credentials.keyword = keyword.into();
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn credentials_ready(&self) -> bool {
        self.credentials.is_complete()
    }
}
