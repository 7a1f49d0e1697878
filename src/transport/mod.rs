/// Pluggable transport for sending operation requests to the file API.
///
/// A transport returns every response it receives, whatever the status
/// code, with the body read as raw bytes. Only the absence of a response
/// is an error.
pub mod http;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::input::{Credentials, SelectedFile};
use crate::operation::OperationKind;

pub use self::http::HttpTransport;

/// Multipart field names expected by the API.
pub const FIELD_FILE: &str = "file";
pub const FIELD_USERNAME: &str = "username";
pub const FIELD_KEYWORD: &str = "keyword";

/// The fields of one operation request.
#[derive(Debug, Clone, Copy)]
pub struct OperationForm<'a> {
    pub file: &'a SelectedFile,
    pub credentials: &'a Credentials,
}

/// A received response, success or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// `content-type` header, if present.
    pub content_type: Option<String>,
    /// `content-disposition` header, if present, decoded as UTF-8 or Latin-1.
    pub content_disposition: Option<String>,
    /// Body bytes, never interpreted by the transport.
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    pub fn with_content_disposition(mut self, value: impl Into<String>) -> Self {
        self.content_disposition = Some(value.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for request transports.
#[async_trait]
pub trait FileTransport: Send + Sync {
    /// Human-readable name of this transport (e.g., "HTTP").
    fn name(&self) -> &str;

    /// Send one operation request and return the raw response.
    async fn send(
        &self,
        kind: OperationKind,
        form: OperationForm<'_>,
    ) -> Result<RawResponse, TransportError>;
}
