use domain::DocumentError;
use gwc_storage::StorageError;

/// 部署错误。
///
/// `InvalidFormat` / `InvalidDocument` 发生在快照写入之前；
/// 其余错误发生时快照已落库。
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("{0}")]
    InvalidFormat(String),
    #[error("{0}")]
    InvalidDocument(String),
    #[error("invalid formula for calculation tag '{tag}': '{formula}'")]
    InvalidFormula { tag: String, formula: String },
    #[error("{0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
}

impl From<DocumentError> for DeployError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::InvalidFormat { .. } => Self::InvalidFormat(err.to_string()),
            DocumentError::Invalid(message) => Self::InvalidDocument(message),
        }
    }
}

impl From<StorageError> for DeployError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
