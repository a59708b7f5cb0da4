use crate::models::expense::ValidationError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(#[source] rusqlite::Error),

    #[error("Failed to write expenses: {0}")]
    Write(#[source] rusqlite::Error),

    #[error("Failed to read expenses: {0}")]
    Read(#[source] rusqlite::Error),

    #[error("Bucket '{key}' has invalid contents: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode bucket '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bucket key '{key}' is not a valid MM-DD-YYYY date")]
    InvalidKey {
        key: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Expense with ID {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_is_reported_as_write_side() {
        let source = serde_json::from_str::<u8>("not a number").unwrap_err();
        let error = StoreError::Encode {
            key: "01-15-2025".to_string(),
            source,
        };

        assert!(error.to_string().starts_with("Failed to encode bucket '01-15-2025'"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
