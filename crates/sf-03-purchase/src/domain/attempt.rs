//! # Purchase Attempt
//!
//! One submission of one product with one payment method. Transitions are
//! checked at runtime; an invalid move returns [`TransitionError`] and leaves
//! the attempt unchanged.
//!
//! ```text
//! [Idle] ──begin──→ [Submitting] ──succeed──→ [Succeeded]
//!                        │
//!                        └──── fail ────→ [Failed]
//! ```

use crate::domain::intent::PurchaseIntent;
use crate::domain::reason::FailureReason;
use serde::Serialize;
use shared_types::{AttemptId, IntentId, PaymentMethodId, ProductId, Receipt, Timestamp};
use std::fmt;
use thiserror::Error;

/// Lifecycle phase of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchasePhase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl PurchasePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for PurchasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The single live outcome of an attempt. Each transition replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PurchaseOutcome {
    Processing,
    Succeeded { receipt: Option<Receipt> },
    Failed { reason: FailureReason },
}

/// Invalid phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid purchase transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: PurchasePhase,
    pub to: PurchasePhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseAttempt {
    id: AttemptId,
    product_id: ProductId,
    payment_method_id: PaymentMethodId,
    phase: PurchasePhase,
    outcome: Option<PurchaseOutcome>,
    intent: Option<PurchaseIntent>,
    provider_intent: Option<IntentId>,
    created_at: Timestamp,
    finished_at: Option<Timestamp>,
}

impl PurchaseAttempt {
    pub fn new(product_id: ProductId, payment_method_id: PaymentMethodId, now: Timestamp) -> Self {
        Self {
            id: AttemptId::new(),
            product_id,
            payment_method_id,
            phase: PurchasePhase::Idle,
            outcome: None,
            intent: None,
            provider_intent: None,
            created_at: now,
            finished_at: None,
        }
    }

    pub fn id(&self) -> AttemptId {
        self.id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn payment_method_id(&self) -> &PaymentMethodId {
        &self.payment_method_id
    }

    pub fn phase(&self) -> PurchasePhase {
        self.phase
    }

    /// `None` while idle.
    pub fn outcome(&self) -> Option<&PurchaseOutcome> {
        self.outcome.as_ref()
    }

    pub fn intent(&self) -> Option<&PurchaseIntent> {
        self.intent.as_ref()
    }

    pub fn provider_intent(&self) -> Option<&IntentId> {
        self.provider_intent.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<Timestamp> {
        self.finished_at
    }

    fn expect_phase(&self, expected: PurchasePhase, to: PurchasePhase) -> Result<(), TransitionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(TransitionError {
                from: self.phase,
                to,
            })
        }
    }

    /// Idle → Submitting.
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        self.expect_phase(PurchasePhase::Idle, PurchasePhase::Submitting)?;
        self.phase = PurchasePhase::Submitting;
        self.outcome = Some(PurchaseOutcome::Processing);
        Ok(())
    }

    /// Record the priced intent. Only once, while submitting.
    pub fn attach_intent(&mut self, intent: PurchaseIntent) -> Result<(), TransitionError> {
        self.expect_phase(PurchasePhase::Submitting, PurchasePhase::Submitting)?;
        if self.intent.is_some() {
            return Err(TransitionError {
                from: self.phase,
                to: self.phase,
            });
        }
        self.intent = Some(intent);
        Ok(())
    }

    /// Record the id the provider assigned to the intent.
    pub fn record_provider_intent(&mut self, intent_id: IntentId) -> Result<(), TransitionError> {
        self.expect_phase(PurchasePhase::Submitting, PurchasePhase::Submitting)?;
        self.provider_intent = Some(intent_id);
        Ok(())
    }

    /// Submitting → Succeeded.
    pub fn succeed(&mut self, receipt: Option<Receipt>, now: Timestamp) -> Result<(), TransitionError> {
        self.expect_phase(PurchasePhase::Submitting, PurchasePhase::Succeeded)?;
        self.phase = PurchasePhase::Succeeded;
        self.outcome = Some(PurchaseOutcome::Succeeded { receipt });
        self.finished_at = Some(now);
        Ok(())
    }

    /// Submitting → Failed.
    pub fn fail(&mut self, reason: FailureReason, now: Timestamp) -> Result<(), TransitionError> {
        self.expect_phase(PurchasePhase::Submitting, PurchasePhase::Failed)?;
        self.phase = PurchasePhase::Failed;
        self.outcome = Some(PurchaseOutcome::Failed { reason });
        self.finished_at = Some(now);
        Ok(())
    }
}

/// What `submit` returns for an attempt the provider settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReport {
    pub attempt_id: AttemptId,
    pub product_id: ProductId,
    pub intent_id: Option<IntentId>,
    pub outcome: PurchaseOutcome,
}

impl PurchaseReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, PurchaseOutcome::Succeeded { .. })
    }
}
