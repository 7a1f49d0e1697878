use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),

    #[error("Artifact store failed: {0}")]
    ArtifactStore(String),

    #[error("Unknown artifact handle: {0}")]
    UnknownHandle(String),

    #[error("No download artifact is available")]
    NoArtifact,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to obtain any response from the remote API.
///
/// A response with an error status is *not* a transport error; it is
/// handed to the classifier like any other response.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed before a response arrived: {0}")]
    Request(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Reading the response body failed: {0}")]
    Body(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
