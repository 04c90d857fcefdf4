use thiserror::Error;

/// Failures raised by wardrobe storage and domain operations.
///
/// None of these escape the operation boundary: the services turn them into
/// user-facing notices. Declining an import confirmation is not an error, see
/// `ImportOutcome::Cancelled`.
#[derive(Debug, Error)]
pub enum WardrobeError {
    /// Required input missing or malformed (e.g. an empty item name)
    #[error("{0}")]
    Validation(String),

    /// A stored value is not valid JSON for the type it should hold
    #[error("Stored value under '{key}' could not be decoded: {source}")]
    StorageParse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Moving, copying or deleting an image file failed
    #[error("File operation on {uri} failed: {message}")]
    FileOperation { uri: String, message: String },

    /// A backup document lacks required fields or is not JSON at all
    #[error("Invalid backup file format: {0}")]
    InvalidFormat(String),

    /// The store could not write its contents to disk
    #[error("Failed to persist wardrobe data: {0:#}")]
    Persist(anyhow::Error),
}

impl WardrobeError {
    pub fn file_operation(uri: impl Into<String>, message: impl ToString) -> Self {
        WardrobeError::FileOperation {
            uri: uri.into(),
            message: message.to_string(),
        }
    }
}
