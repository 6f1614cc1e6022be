// Discovery engine error taxonomy

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Version {0} not found")]
    VersionNotFound(u32),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiscoveryError {
    /// Short name of the failure kind, used in user-facing notifications
    pub fn kind(&self) -> &'static str {
        match self {
            DiscoveryError::MalformedDocument(_) => "Malformed document",
            DiscoveryError::UnknownQuestion(_) => "Unknown question",
            DiscoveryError::VersionNotFound(_) => "Version not found",
            DiscoveryError::UnsupportedFormat(_) => "Unsupported format",
            DiscoveryError::Storage(_) => "Storage failure",
            DiscoveryError::Serialization(_) => "Serialization failure",
            DiscoveryError::Config(_) => "Configuration error",
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        DiscoveryError::MalformedDocument(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        DiscoveryError::Storage(message.into())
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryError::MalformedDocument(err.to_string())
    }
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
