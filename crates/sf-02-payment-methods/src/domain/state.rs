//! # Registry State
//!
//! Everything the registry guards with one lock: the method snapshot, the
//! last session seen on the bus and the current selection.

use crate::domain::errors::{RegistryError, SelectionRejection};
use crate::domain::method_set::PaymentMethodSet;
use crate::domain::selection::{check_usable, default_selection};
use shared_types::{PaymentMethod, PaymentMethodId, WalletSession};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct RegistryState {
    methods: Arc<PaymentMethodSet>,
    session: Option<WalletSession>,
    selected: Option<PaymentMethodId>,
}

impl RegistryState {
    pub fn methods(&self) -> Arc<PaymentMethodSet> {
        self.methods.clone()
    }

    pub fn session(&self) -> Option<&WalletSession> {
        self.session.as_ref()
    }

    pub fn selected(&self) -> Option<&PaymentMethodId> {
        self.selected.as_ref()
    }

    /// Install a new snapshot. A selection that is still usable survives;
    /// otherwise the default policy applies.
    pub fn replace_methods(&mut self, methods: Arc<PaymentMethodSet>) -> Option<PaymentMethodId> {
        self.methods = methods;
        let keep = self
            .selected
            .as_ref()
            .is_some_and(|id| self.resolve(id).is_ok());
        if !keep {
            self.selected = default_selection(&self.methods, self.session.as_ref());
        }
        self.selected.clone()
    }

    /// A wallet connected or disconnected: re-derive the selection.
    pub fn apply_session(&mut self, session: Option<WalletSession>) -> Option<PaymentMethodId> {
        self.session = session;
        self.selected = default_selection(&self.methods, self.session.as_ref());
        self.selected.clone()
    }

    /// Same chain, different account: the selection stays valid.
    pub fn update_account(&mut self, session: WalletSession) {
        self.session = Some(session);
    }

    /// Explicit user selection.
    pub fn select(&mut self, id: &PaymentMethodId) -> Result<PaymentMethod, RegistryError> {
        let method = self.resolve(id)?;
        self.selected = Some(id.clone());
        Ok(method)
    }

    /// Look up `id` and check it against the current session.
    pub fn resolve(&self, id: &PaymentMethodId) -> Result<PaymentMethod, RegistryError> {
        let method = self.methods.get(id).ok_or_else(|| RegistryError::InvalidSelection {
            id: id.clone(),
            reason: SelectionRejection::UnknownMethod,
        })?;
        check_usable(method, self.session.as_ref()).map_err(|reason| {
            RegistryError::InvalidSelection {
                id: id.clone(),
                reason,
            }
        })?;
        Ok(method.clone())
    }
}
