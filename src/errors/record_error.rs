use thiserror::Error;

/// Errors when fetching a protein record from the external record source
///
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Record `{0}` not found")]
    NotFound(String),
    #[error("Transport error while fetching `{0}`:\n\t{1}")]
    Transport(String, reqwest::Error),
    #[error("Unexpected response status {1} while fetching `{0}`")]
    UnexpectedStatus(String, u16),
    #[error("Unable to deserialize record `{0}`:\n\t{1}")]
    Deserialization(String, serde_json::Error),
}

impl RecordError {
    /// Returns true if another attempt might succeed
    ///
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotFound(_) | Self::Deserialization(_, _) => false,
            Self::Transport(_, _) => true,
            Self::UnexpectedStatus(_, status) => *status == 429 || *status >= 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(!RecordError::NotFound("P12345".to_string()).is_retryable());
        assert!(RecordError::UnexpectedStatus("P12345".to_string(), 503).is_retryable());
        assert!(RecordError::UnexpectedStatus("P12345".to_string(), 429).is_retryable());
        assert!(!RecordError::UnexpectedStatus("P12345".to_string(), 400).is_retryable());
    }
}
