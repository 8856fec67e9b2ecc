//! # Outbound Ports (Driven Ports / SPI)
//!
//! The wallet provider: browser extension, mobile wallet bridge or the
//! sandbox used in tests.

use shared_types::{BlockchainId, WalletKind};
use thiserror::Error;

/// What the wallet reports on a successful connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConnection {
    pub address: String,
    pub blockchain_id: BlockchainId,
}

/// Errors reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletProviderError {
    /// The wallet refused the request.
    #[error("Rejected by wallet: {0}")]
    Rejected(String),

    /// The user dismissed the prompt.
    #[error("Cancelled by user")]
    Cancelled,

    /// The wallet could not be reached at all.
    #[error("Wallet unreachable: {0}")]
    Unreachable(String),
}

/// Wallet provider.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet of `kind` for an account.
    async fn connect(&self, kind: &WalletKind) -> Result<WalletConnection, WalletProviderError>;

    /// Release the wallet connection.
    async fn disconnect(&self) -> Result<(), WalletProviderError>;
}
