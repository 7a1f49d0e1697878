/// The three remote file operations.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which transform the remote API should apply to the uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Encrypt,
    Decrypt,
    Verify,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [Self::Encrypt, Self::Decrypt, Self::Verify];

    /// Path segment under `/api/file/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
            Self::Verify => "verify",
        }
    }

    /// Whether a successful response carries a downloadable file.
    pub fn produces_artifact(self) -> bool {
        !matches!(self, Self::Verify)
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::Encrypt => "File encrypted successfully",
            Self::Decrypt => "File decrypted successfully",
            Self::Verify => "File verified successfully",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "encrypt" => Ok(Self::Encrypt),
            "decrypt" => Ok(Self::Decrypt),
            "verify" => Ok(Self::Verify),
            other => Err(format!("unknown operation: {other}")),
        }
    }
}
