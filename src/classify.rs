/// Response classification.
///
/// Decides whether a response body is the requested artifact or an error
/// payload that arrived as raw bytes, and turns it into the single status
/// the user sees. Everything here is a pure function of the response, so it
/// is tested without any network layer.
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;
use crate::input::OCTET_STREAM;
use crate::operation::OperationKind;
use crate::status::StatusMessage;
use crate::transport::RawResponse;

/// Name used when the response does not suggest one.
pub const FALLBACK_FILENAME: &str = "processed_file";

/// Error payload was parsed but carried no usable `detail`.
pub const MSG_GENERIC_ERROR: &str = "An error occurred";
/// Error payload declared JSON but could not be decoded or parsed.
pub const MSG_ERROR_BODY_UNREADABLE: &str = "Failed to process error response";
/// Error payload was not JSON.
pub const MSG_UNRECOGNIZED_FORMAT: &str = "Unrecognized error format from server";
/// No response arrived.
pub const MSG_TRANSPORT_FAILURE: &str = "Failed to process file";

/// A successful response body waiting to be installed as a download.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingArtifact {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

impl std::fmt::Debug for PendingArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingArtifact")
            .field("size", &self.data.len())
            .field("mime_type", &self.mime_type)
            .field("filename", &self.filename)
            .finish()
    }
}

/// Outcome of classifying one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Terminal status: always `Success` or `Error`.
    pub status: StatusMessage,
    /// Present only for a successful encrypt/decrypt.
    pub artifact: Option<PendingArtifact>,
    /// Verification verdict text from the server, when it sent one.
    pub server_message: Option<String>,
}

impl Classification {
    fn error(text: impl Into<String>) -> Self {
        Self {
            status: StatusMessage::error(text),
            artifact: None,
            server_message: None,
        }
    }
}

/// Classify a received response of any status.
pub fn classify_response(kind: OperationKind, response: RawResponse) -> Classification {
    if response.is_ok() {
        classify_success(kind, response)
    } else if response.is_success() {
        classify_unexpected_success(&response)
    } else {
        classify_failure(&response)
    }
}

/// Classify a 200 response.
///
/// A JSON body carrying `detail` is an application failure even at 200.
pub fn classify_success(kind: OperationKind, response: RawResponse) -> Classification {
    let json = json_body(&response);

    if let Some(Value::Object(map)) = &json {
        if let Some(detail) = map.get("detail") {
            return Classification::error(
                detail_text(detail).unwrap_or_else(|| MSG_GENERIC_ERROR.to_string()),
            );
        }
    }

    let server_message = match (&json, kind) {
        (Some(Value::Object(map)), OperationKind::Verify) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    };

    let artifact = if kind.produces_artifact() {
        let filename = response
            .content_disposition
            .as_deref()
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
        debug!(filename = %filename, "Derived download filename");

        Some(PendingArtifact {
            mime_type: response
                .content_type
                .clone()
                .unwrap_or_else(|| OCTET_STREAM.to_string()),
            data: response.body,
            filename,
        })
    } else {
        None
    };

    Classification {
        status: StatusMessage::success(kind.success_message()),
        artifact,
        server_message,
    }
}

/// Classify a 2xx response other than 200.
///
/// The request went through but the operation did not hand back its result.
/// A `detail` is shown when the body parses as JSON, whatever its declared
/// type.
pub fn classify_unexpected_success(response: &RawResponse) -> Classification {
    debug!(status = response.status, "Unexpected success status");
    let message = serde_json::from_slice::<Value>(&response.body)
        .ok()
        .as_ref()
        .and_then(|value| value.get("detail"))
        .and_then(detail_text)
        .unwrap_or_else(|| MSG_GENERIC_ERROR.to_string());
    Classification::error(message)
}

/// Classify a non-2xx response.
pub fn classify_failure(response: &RawResponse) -> Classification {
    Classification::error(error_message_from_body(
        &response.body,
        response.content_type.as_deref(),
    ))
}

/// Classify the absence of any response.
pub fn classify_transport_failure(_error: &TransportError) -> Classification {
    Classification::error(MSG_TRANSPORT_FAILURE)
}

/// Turn an error body into a user-facing message.
///
/// Only bodies declared as JSON are decoded; any other format yields
/// [`MSG_UNRECOGNIZED_FORMAT`] without looking at the bytes.
pub fn error_message_from_body(body: &[u8], content_type: Option<&str>) -> String {
    if !content_type.is_some_and(is_json_content_type) {
        return MSG_UNRECOGNIZED_FORMAT.to_string();
    }

    let Ok(text) = std::str::from_utf8(body) else {
        return MSG_ERROR_BODY_UNREADABLE.to_string();
    };
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return MSG_ERROR_BODY_UNREADABLE.to_string();
    };

    value
        .get("detail")
        .and_then(detail_text)
        .unwrap_or_else(|| MSG_GENERIC_ERROR.to_string())
}

/// Extract `<value>` from `filename="<value>"` in a `content-disposition` header.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    const KEY: &str = "filename=\"";

    // ASCII lowercasing keeps byte offsets aligned with `header`.
    let start = header.to_ascii_lowercase().find(KEY)? + KEY.len();
    let rest = &header[start..];
    let end = rest.find('"')?;
    let value = &rest[..end];

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// `application/json`, with or without parameters, or any `+json` type.
pub fn is_json_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    media_type == "application/json" || media_type.ends_with("+json")
}

fn json_body(response: &RawResponse) -> Option<Value> {
    if !response.content_type.as_deref().is_some_and(is_json_content_type) {
        return None;
    }
    serde_json::from_slice(&response.body).ok()
}

/// `detail` is usually a string; validation errors send a list of objects
/// with a `msg` field.
fn detail_text(detail: &Value) -> Option<String> {
    match detail {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str).or(item.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}
