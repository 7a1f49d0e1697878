/// HTTP transport via reqwest.
///
/// Posts a multipart form to `<base>/api/file/<operation>` and reads the
/// body as bytes regardless of status or content type. The server may put
/// a JSON error in a body the client expected to be binary, so nothing is
/// decoded here.
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart;
use reqwest::Client;
use tracing::debug;

use super::{FileTransport, OperationForm, RawResponse, FIELD_FILE, FIELD_KEYWORD, FIELD_USERNAME};
use crate::config::ApiConfig;
use crate::error::{ClientError, Result, TransportError};
use crate::operation::OperationKind;

/// HTTP transport for the file API.
pub struct HttpTransport {
    client: Client,
    config: ApiConfig,
}

impl HttpTransport {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn build_form(form: OperationForm<'_>) -> std::result::Result<multipart::Form, TransportError> {
        let part = multipart::Part::bytes(form.file.data.clone())
            .file_name(form.file.name.clone())
            .mime_str(form.file.mime_type_or_default())
            .map_err(|e| TransportError::Request(format!("invalid file MIME type: {e}")))?;

        Ok(multipart::Form::new()
            .part(FIELD_FILE, part)
            .text(FIELD_USERNAME, form.credentials.identity.clone())
            .text(FIELD_KEYWORD, form.credentials.keyword.expose().to_string()))
    }
}

fn header_text(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers.get(name).map(|v| decode_header_bytes(v.as_bytes()))
}

/// Header bytes are UTF-8 when they validate, Latin-1 otherwise.
fn decode_header_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}

#[async_trait]
impl FileTransport for HttpTransport {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn send(
        &self,
        kind: OperationKind,
        form: OperationForm<'_>,
    ) -> std::result::Result<RawResponse, TransportError> {
        let url = self.config.endpoint(kind);
        let multipart = Self::build_form(form)?;

        debug!(url = %url, file_name = %form.file.name, "Posting operation request");

        let resp = self
            .client
            .post(&url)
            .multipart(multipart)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status().as_u16();
        let content_type = header_text(resp.headers(), CONTENT_TYPE);
        let content_disposition = header_text(resp.headers(), CONTENT_DISPOSITION);

        let body = resp.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Body(e.to_string())
            }
        })?;

        debug!(status, bytes = body.len(), "Response received");

        Ok(RawResponse {
            status,
            content_type,
            content_disposition,
            body: body.to_vec(),
        })
    }
}
