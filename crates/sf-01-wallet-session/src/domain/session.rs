//! # Session Slot
//!
//! Holds at most one [`WalletSession`]. Installing a session while one is
//! present is a logic error in the caller; the service always takes the old
//! session out first.

use shared_types::WalletSession;

/// At-most-one holder of the active session.
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: Option<WalletSession>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&WalletSession> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut WalletSession> {
        self.current.as_mut()
    }

    /// Install `session`, returning whatever was there before.
    pub fn install(&mut self, session: WalletSession) -> Option<WalletSession> {
        self.current.replace(session)
    }

    /// Remove the active session.
    pub fn take(&mut self) -> Option<WalletSession> {
        self.current.take()
    }

    /// Remove the active session only if it is still `expected`.
    ///
    /// Guards against tearing down a session installed by a connect that
    /// completed while a disconnect was waiting on the provider.
    pub fn take_if(&mut self, expected: &WalletSession) -> Option<WalletSession> {
        if self.current.as_ref() == Some(expected) {
            self.current.take()
        } else {
            None
        }
    }
}
