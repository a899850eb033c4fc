//! Error types for the governance transaction client.
//!
//! Local failures (unknown authenticator, missing signature data, bad
//! configuration) are raised before anything touches the network. Transport
//! and contract failures are wrapped without modification so callers can
//! inspect revert reasons themselves.

use ethers::types::{Address, TxHash};
use thiserror::Error;

/// Boxed transport error as surfaced by the underlying middleware
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for governance client operations
#[derive(Error, Debug)]
pub enum GovernanceError {
    /// Authenticator address has no entry in the network configuration
    #[error("Invalid authenticator: {0:?}")]
    UnknownAuthenticator(Address),

    /// Voting strategy address has no entry in the network configuration
    #[error("Invalid strategy: {0:?}")]
    UnknownStrategy(Address),

    /// Strategy index does not fit the `int8` slot of proposal validation params
    #[error("Strategy index {0} exceeds int8 range")]
    InvalidStrategyIndex(u8),

    /// Authenticator requires signature data that the envelope does not carry
    #[error("Signature data is required for the {0} authenticator")]
    MissingSignature(&'static str),

    /// Signer cannot report an address
    #[error("Signer has no sender address")]
    MissingSender,

    /// Contract creation bytecode was not supplied
    #[error("Missing creation bytecode for {0}")]
    MissingBytecode(&'static str),

    /// Error returned by the provider or signer, passed through unchanged
    #[error("Provider error: {0}")]
    Provider(#[source] BoxError),

    /// Transaction was mined but reverted
    #[error("Transaction {0:?} reverted")]
    TransactionFailed(TxHash),

    /// No receipt within the configured timeout
    #[error("Transaction timeout after {0} seconds")]
    TransactionTimeout(u64),

    /// Unexpected data returned by a contract or node
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// ABI parsing, encoding or decoding failure
    #[error("ABI error: {0}")]
    Abi(#[from] ethers::abi::Error),

    /// Malformed signature bytes
    #[error("Signature error: {0}")]
    Signature(#[from] ethers::types::SignatureError),

    /// Local wallet could not be created
    #[error("Wallet error: {0}")]
    Wallet(#[from] ethers::signers::WalletError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// URL parse error
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// HTTP client could not be built
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl GovernanceError {
    /// Wrap a provider or middleware error
    pub fn provider<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Provider(Box::new(error))
    }
}

/// Result type alias for governance client operations
pub type Result<T> = std::result::Result<T, GovernanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_authenticator_display() {
        let err = GovernanceError::UnknownAuthenticator(Address::zero());
        assert_eq!(
            err.to_string(),
            "Invalid authenticator: 0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_provider_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = GovernanceError::provider(io);
        assert!(err.to_string().contains("refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_missing_signature_display() {
        let err = GovernanceError::MissingSignature("ethSig");
        assert!(err.to_string().contains("ethSig"));
    }
}
