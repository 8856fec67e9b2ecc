//! # Wallet Errors

use crate::ports::outbound::WalletProviderError;
use shared_types::ErrorKind;
use thiserror::Error;

/// Why a connect attempt did not produce a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionFailure {
    /// The wallet refused the request.
    Rejected,
    /// The user dismissed the wallet prompt.
    Cancelled,
    /// The wallet did not answer within the connect timeout.
    TimedOut,
}

impl std::fmt::Display for ConnectionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Rejected => "rejected by wallet",
            Self::Cancelled => "cancelled by user",
            Self::TimedOut => "timed out",
        };
        f.write_str(text)
    }
}

/// Errors returned by the wallet session manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// Connect failed on the wallet side.
    #[error("Wallet connection failed: {0}")]
    Connection(ConnectionFailure),

    /// The wallet provider could not be reached.
    #[error("Wallet provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Another connect or disconnect is still running.
    #[error("Another wallet operation is in progress")]
    OperationInProgress,

    /// The operation needs an active session.
    #[error("No active wallet session")]
    NoActiveSession,
}

impl WalletError {
    /// Shared taxonomy classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) => ErrorKind::ConnectionError,
            Self::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            Self::OperationInProgress => ErrorKind::OperationInProgress,
            Self::NoActiveSession => ErrorKind::NotFound,
        }
    }
}

impl From<WalletProviderError> for WalletError {
    fn from(err: WalletProviderError) -> Self {
        match err {
            WalletProviderError::Rejected(_) => Self::Connection(ConnectionFailure::Rejected),
            WalletProviderError::Cancelled => Self::Connection(ConnectionFailure::Cancelled),
            WalletProviderError::Unreachable(detail) => Self::ProviderUnavailable(detail),
        }
    }
}
