/// User-visible status and the per-dispatch lifecycle phase.
use std::fmt;

use serde::Serialize;

/// The single message shown to the user. Exactly one is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "lowercase")]
pub enum StatusMessage {
    #[default]
    None,
    Info(String),
    Success(String),
    Error(String),
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self::Info(text.into())
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error(text.into())
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Info(t) | Self::Success(t) | Self::Error(t) => Some(t),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Heading a front end shows above the text.
    pub fn title(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Info(_) => "Info",
            Self::Success(_) => "Success",
            Self::Error(_) => "Error",
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) => write!(f, "{}: {text}", self.title()),
            None => Ok(()),
        }
    }
}

/// Where a dispatch is in its lifecycle.
///
/// `Idle → Validating → { Rejected | Dispatching → { ClassifyingSuccess →
/// {Success | Error} | ClassifyingFailure → Error } }`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    #[default]
    Idle,
    Validating,
    Rejected,
    Dispatching,
    ClassifyingSuccess,
    ClassifyingFailure,
    Success,
    Error,
}

impl DispatchPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Rejected)
    }

    /// Between the request going out and the outcome being known.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::Dispatching | Self::ClassifyingSuccess | Self::ClassifyingFailure
        )
    }
}
