//! # Wallet Session Service
//!
//! Implements [`WalletSessionApi`] over a [`WalletProvider`].
//!
//! ## Connect Flow
//!
//! ```text
//! connect(kind)
//!   │  acquire operation permit ── busy ──► OperationInProgress
//!   ▼
//! spawn ─► take old session ─► provider.disconnect ─► wallet/disconnected
//!            │
//!            ▼
//!          provider.connect (bounded by connect_timeout)
//!            │
//!            ▼
//!          install session ─► wallet/connected
//! ```
//!
//! The provider work runs on its own task: a caller that stops awaiting
//! does not cancel it, the session is still installed and announced.

use crate::domain::errors::{ConnectionFailure, WalletError};
use crate::domain::session::SessionSlot;
use crate::ports::inbound::WalletSessionApi;
use crate::ports::outbound::WalletProvider;
use parking_lot::{Mutex, RwLock};
use shared_bus::{EventPublisher, StorefrontEvent};
use shared_types::{SystemTimeSource, TimeSource, WalletKind, WalletSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Wallet session manager configuration.
#[derive(Debug, Clone)]
pub struct WalletSessionConfig {
    /// Upper bound for every wallet provider call.
    pub connect_timeout: Duration,
}

impl Default for WalletSessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Connecting,
    Disconnecting,
}

struct Inner {
    provider: Arc<dyn WalletProvider>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn TimeSource>,
    slot: RwLock<SessionSlot>,
    operation: Mutex<Option<Operation>>,
    config: WalletSessionConfig,
}

/// Clears the running operation when the provider task finishes.
struct OperationPermit {
    inner: Arc<Inner>,
}

impl OperationPermit {
    fn acquire(inner: &Arc<Inner>, operation: Operation) -> Result<Self, WalletError> {
        let mut running = inner.operation.lock();
        if let Some(current) = *running {
            debug!(running = ?current, requested = ?operation, "Wallet operation rejected");
            return Err(WalletError::OperationInProgress);
        }
        *running = Some(operation);
        Ok(Self {
            inner: inner.clone(),
        })
    }
}

impl Drop for OperationPermit {
    fn drop(&mut self) {
        *self.inner.operation.lock() = None;
    }
}

/// Wallet session manager.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct WalletSessionManager {
    inner: Arc<Inner>,
}

impl WalletSessionManager {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        publisher: Arc<dyn EventPublisher>,
        config: WalletSessionConfig,
    ) -> Self {
        Self::with_clock(provider, publisher, Arc::new(SystemTimeSource), config)
    }

    /// Construct with an explicit clock for `connected_at`.
    pub fn with_clock(
        provider: Arc<dyn WalletProvider>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn TimeSource>,
        config: WalletSessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                publisher,
                clock,
                slot: RwLock::new(SessionSlot::new()),
                operation: Mutex::new(None),
                config,
            }),
        }
    }
}

impl Inner {
    async fn run_connect(&self, kind: WalletKind) -> Result<WalletSession, WalletError> {
        info!(wallet_kind = %kind, "Connecting wallet");

        let previous = self.slot.write().take();
        if let Some(previous) = previous {
            if let Err(e) = self.provider_disconnect().await {
                warn!(address = %previous.short_address(), error = %e, "Provider disconnect failed during reconnect");
            }
            info!(address = %previous.short_address(), "Previous wallet session closed");
            self.publisher
                .publish(StorefrontEvent::WalletDisconnected(previous));
        }

        let connection = match timeout(self.config.connect_timeout, self.provider.connect(&kind)).await {
            Ok(Ok(connection)) => connection,
            Ok(Err(e)) => {
                warn!(wallet_kind = %kind, error = %e, "Wallet connect failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(wallet_kind = %kind, timeout_ms = self.config.connect_timeout.as_millis() as u64, "Wallet connect timed out");
                return Err(WalletError::Connection(ConnectionFailure::TimedOut));
            }
        };

        let session = WalletSession {
            address: connection.address,
            blockchain_id: connection.blockchain_id,
            wallet_kind: kind,
            connected_at: self.clock.now(),
        };
        self.slot.write().install(session.clone());

        info!(
            wallet_kind = %session.wallet_kind,
            blockchain = %session.blockchain_id,
            address = %session.short_address(),
            "Wallet connected"
        );
        self.publisher
            .publish(StorefrontEvent::WalletConnected(session.clone()));
        Ok(session)
    }

    async fn run_disconnect(&self) -> Result<(), WalletError> {
        let Some(session) = self.slot.read().current().cloned() else {
            return Ok(());
        };

        self.provider_disconnect().await?;

        let removed = self.slot.write().take_if(&session);
        if let Some(session) = removed {
            info!(address = %session.short_address(), "Wallet disconnected");
            self.publisher
                .publish(StorefrontEvent::WalletDisconnected(session));
        }
        Ok(())
    }

    async fn provider_disconnect(&self) -> Result<(), WalletError> {
        match timeout(self.config.connect_timeout, self.provider.disconnect()).await {
            Ok(result) => result.map_err(WalletError::from),
            Err(_) => Err(WalletError::ProviderUnavailable(
                "wallet disconnect timed out".to_string(),
            )),
        }
    }
}

fn join_error(e: tokio::task::JoinError) -> WalletError {
    WalletError::ProviderUnavailable(format!("wallet task aborted: {}", e))
}

#[async_trait::async_trait]
impl WalletSessionApi for WalletSessionManager {
    async fn connect(&self, kind: WalletKind) -> Result<WalletSession, WalletError> {
        let permit = OperationPermit::acquire(&self.inner, Operation::Connecting)?;
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let _permit = permit;
            inner.run_connect(kind).await
        })
        .await
        .map_err(join_error)?
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        if self.inner.slot.read().current().is_none() {
            debug!("Disconnect without active session");
            return Ok(());
        }
        let permit = OperationPermit::acquire(&self.inner, Operation::Disconnecting)?;
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let _permit = permit;
            inner.run_disconnect().await
        })
        .await
        .map_err(join_error)?
    }

    fn active_session(&self) -> Option<WalletSession> {
        self.inner.slot.read().current().cloned()
    }

    fn is_connecting(&self) -> bool {
        *self.inner.operation.lock() == Some(Operation::Connecting)
    }

    fn change_account(&self, address: String) -> Result<WalletSession, WalletError> {
        let (previous_address, session) = {
            let mut slot = self.inner.slot.write();
            let session = slot.current_mut().ok_or(WalletError::NoActiveSession)?;
            if session.address == address {
                return Ok(session.clone());
            }
            let previous = std::mem::replace(&mut session.address, address);
            (previous, session.clone())
        };

        info!(
            from = %shared_types::truncate_address(&previous_address),
            to = %session.short_address(),
            "Wallet account changed"
        );
        self.inner
            .publisher
            .publish(StorefrontEvent::WalletAccountChanged {
                previous_address,
                session: session.clone(),
            });
        Ok(session)
    }
}
