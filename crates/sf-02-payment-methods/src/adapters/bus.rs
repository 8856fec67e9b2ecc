//! # Event Bus Adapter
//!
//! Keeps the registry's view of the wallet session in step with the bus.
//!
//! ```text
//! wallet/connected ─────────┐
//! wallet/disconnected ──────┼──► RegistryState ──► selection re-derived
//! wallet/account-changed ───┘                       (account change: kept)
//! ```

use crate::domain::state::RegistryState;
use parking_lot::RwLock;
use shared_bus::{EventBus, EventTopic, StorefrontEvent, Subscription};
use std::sync::Arc;
use tracing::debug;

/// Subscribe `state` to the wallet lifecycle topics.
pub fn attach(bus: &EventBus, state: Arc<RwLock<RegistryState>>) -> Vec<Subscription> {
    bus.subscribe_all(&EventTopic::WALLET, move |event| {
        match event {
            StorefrontEvent::WalletConnected(session) => {
                let selected = state.write().apply_session(Some(session.clone()));
                debug!(blockchain = %session.blockchain_id, selected = ?selected, "Selection re-derived on connect");
            }
            StorefrontEvent::WalletDisconnected(_) => {
                let selected = state.write().apply_session(None);
                debug!(selected = ?selected, "Selection re-derived on disconnect");
            }
            StorefrontEvent::WalletAccountChanged { session, .. } => {
                state.write().update_account(session.clone());
            }
            _ => {}
        }
        Ok(())
    })
}
