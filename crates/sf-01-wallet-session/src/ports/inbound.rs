//! # Inbound Ports (Driving Ports / API)
//!
//! What the UI layer calls.

use crate::domain::errors::WalletError;
use shared_types::{WalletKind, WalletSession};

/// Wallet session API.
#[async_trait::async_trait]
pub trait WalletSessionApi: Send + Sync {
    /// Connect a wallet of `kind`, replacing any active session.
    ///
    /// # Errors
    /// * `WalletError::Connection` - rejected, cancelled or timed out
    /// * `WalletError::ProviderUnavailable` - provider unreachable
    /// * `WalletError::OperationInProgress` - another connect or disconnect is running
    async fn connect(&self, kind: WalletKind) -> Result<WalletSession, WalletError>;

    /// Disconnect the active session. A no-op without one.
    async fn disconnect(&self) -> Result<(), WalletError>;

    /// Copy of the active session.
    fn active_session(&self) -> Option<WalletSession>;

    /// Whether a connect is currently running.
    fn is_connecting(&self) -> bool;

    /// The wallet switched to `address` on the same chain.
    fn change_account(&self, address: String) -> Result<WalletSession, WalletError>;
}
