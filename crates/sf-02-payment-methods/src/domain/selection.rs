//! # Selection Policy
//!
//! Pure functions over a method set and the active session.

use crate::domain::errors::SelectionRejection;
use crate::domain::method_set::PaymentMethodSet;
use shared_types::{PaymentMethod, PaymentMethodId, WalletSession};

/// Default selection for `session`.
///
/// A crypto method matching the session's chain beats any provider default.
/// Provider defaults that are not usable with `session` are skipped.
pub fn default_selection(
    methods: &PaymentMethodSet,
    session: Option<&WalletSession>,
) -> Option<PaymentMethodId> {
    if let Some(session) = session {
        if let Some(method) = methods.crypto_for(&session.blockchain_id) {
            return Some(method.id.clone());
        }
    }
    methods
        .defaults()
        .find(|m| check_usable(m, session).is_ok())
        .map(|m| m.id.clone())
}

/// Whether `method` can be selected or paid with while `session` is active.
pub fn check_usable(
    method: &PaymentMethod,
    session: Option<&WalletSession>,
) -> Result<(), SelectionRejection> {
    if method.crypto_chain().is_none() {
        return Ok(());
    }
    match session {
        None => Err(SelectionRejection::WalletNotConnected),
        Some(session) if method.matches_session(session) => Ok(()),
        Some(_) => Err(SelectionRejection::ChainMismatch),
    }
}
