/// Dispatch preconditions and request assembly.
///
/// Credentials are checked before the file so a user missing both is told
/// about the credentials first.
use thiserror::Error;

use crate::input::InputCollector;
use crate::transport::OperationForm;

pub const MSG_MISSING_CREDENTIALS: &str = "Enter your username and keyword";
pub const MSG_MISSING_FILE: &str = "Select a file first";
pub const MSG_PROCESSING: &str = "Processing your file...";

/// Why a dispatch was refused before any request was made.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("Enter your username and keyword")]
    MissingCredentials,

    #[error("Select a file first")]
    MissingFile,
}

impl Rejection {
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingCredentials => MSG_MISSING_CREDENTIALS,
            Self::MissingFile => MSG_MISSING_FILE,
        }
    }
}

/// Check preconditions and borrow the request fields from `input`.
pub fn prepare(input: &InputCollector) -> Result<OperationForm<'_>, Rejection> {
    if !input.credentials_ready() {
        return Err(Rejection::MissingCredentials);
    }
    let file = input.file().ok_or(Rejection::MissingFile)?;

    Ok(OperationForm {
        file,
        credentials: input.credentials(),
    })
}

/// Informational status shown when a file is chosen.
pub fn file_selected_message(name: &str) -> String {
    format!("File selected: {name}")
}
