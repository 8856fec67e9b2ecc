//! # Purchase Orchestrator (SF-03)
//!
//! Drives one purchase attempt from submission to a terminal outcome.
//!
//! ## State Machine
//!
//! ```text
//! [Idle] ──begin──→ [Submitting] ──succeed──→ [Succeeded]
//!                        │
//!                        └──── fail ────→ [Failed]
//! ```
//!
//! A retry is a new attempt with a new intent. Nothing is retried
//! automatically.
//!
//! ## Provider Round Trips
//!
//! 1. catalog lookup (prices the intent)
//! 2. `create_intent` returns the provider intent id
//! 3. `execute(intent_id)` settles the payment
//!
//! Each call is bounded by `provider_timeout`.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::attempt::{PurchaseAttempt, PurchaseOutcome, PurchasePhase, PurchaseReport, TransitionError};
pub use domain::errors::PurchaseError;
pub use domain::intent::PurchaseIntent;
pub use domain::ledger::AttemptLedger;
pub use domain::reason::FailureReason;
pub use ports::inbound::PurchaseApi;
pub use ports::outbound::{
    CatalogError, ExecutionResult, ExecutionStatus, GatewayError, MethodDirectory, MethodRejected,
    PaymentGateway, ProductCatalog,
};
pub use service::{PurchaseConfig, PurchaseOrchestrator};
