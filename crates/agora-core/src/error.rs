//! Error types for agora-core.

use thiserror::Error;

/// Errors that can occur in primitive operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Account id is not a valid base58-encoded 32-byte key.
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_account_id_display() {
        let err = CoreError::InvalidAccountId("not base58".to_string());
        assert!(err.to_string().contains("not base58"));
    }
}
