//! # Purchase Orchestrator Service
//!
//! Implements [`PurchaseApi`].
//!
//! ## Submit Flow
//!
//! ```text
//! submit(product, method)
//!   │  MethodDirectory::resolve_for_purchase ── rejected ──► InvalidSelection
//!   │  ledger.claim(product) ─────────────── busy ──────► DuplicateSubmission
//!   │  publish payment/started
//!   ▼
//! spawn ─► catalog.product ─► resolve_for_purchase ─► gateway.create_intent ─► gateway.execute
//!            (provider calls bounded by provider_timeout)
//!   │
//!   ▼
//! conclude: ledger transition ─► release claim ─► publish payment/completed | payment/failed
//! ```
//!
//! The pipeline runs on its own task, so a caller that stops awaiting does
//! not cancel a submitting purchase. The claim is released before the
//! terminal event goes out, so a subscriber may retry straight away.

use crate::domain::attempt::{PurchaseAttempt, PurchaseOutcome, PurchaseReport, TransitionError};
use crate::domain::errors::PurchaseError;
use crate::domain::intent::PurchaseIntent;
use crate::domain::ledger::AttemptLedger;
use crate::domain::reason::FailureReason;
use crate::ports::inbound::PurchaseApi;
use crate::ports::outbound::{
    ExecutionStatus, GatewayError, MethodDirectory, PaymentGateway, ProductCatalog,
};
use parking_lot::Mutex;
use shared_bus::{EventPublisher, StorefrontEvent};
use shared_types::{
    AttemptId, IntentId, PaymentMethodId, ProductId, Receipt, SystemTimeSource, TimeSource,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct PurchaseConfig {
    /// Upper bound for each catalog and provider call.
    pub provider_timeout: Duration,
    /// Finished attempts kept for queries.
    pub max_retained_attempts: usize,
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(30),
            max_retained_attempts: 256,
        }
    }
}

/// How the pipeline stopped short of a completed payment.
#[derive(Debug)]
enum StepError {
    Declined {
        intent_id: Option<IntentId>,
        code: Option<String>,
        detail: String,
    },
    Unavailable(String),
    ProductNotFound,
    /// The wallet session changed while the catalog was consulted.
    MethodRevoked(String),
    Interrupted(String),
}

struct Inner {
    gateway: Arc<dyn PaymentGateway>,
    catalog: Arc<dyn ProductCatalog>,
    directory: Arc<dyn MethodDirectory>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn TimeSource>,
    ledger: Mutex<AttemptLedger>,
    config: PurchaseConfig,
}

/// Purchase orchestrator.
///
/// Cheap to clone; clones share the attempt ledger.
#[derive(Clone)]
pub struct PurchaseOrchestrator {
    inner: Arc<Inner>,
}

impl PurchaseOrchestrator {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        catalog: Arc<dyn ProductCatalog>,
        directory: Arc<dyn MethodDirectory>,
        publisher: Arc<dyn EventPublisher>,
        config: PurchaseConfig,
    ) -> Self {
        Self::with_clock(
            gateway,
            catalog,
            directory,
            publisher,
            Arc::new(SystemTimeSource),
            config,
        )
    }

    pub fn with_clock(
        gateway: Arc<dyn PaymentGateway>,
        catalog: Arc<dyn ProductCatalog>,
        directory: Arc<dyn MethodDirectory>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn TimeSource>,
        config: PurchaseConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                catalog,
                directory,
                publisher,
                clock,
                ledger: Mutex::new(AttemptLedger::new(config.max_retained_attempts)),
                config,
            }),
        }
    }
}

impl Inner {
    async fn bounded<T>(
        &self,
        stage: &'static str,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, StepError> {
        match timeout(self.config.provider_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(GatewayError::Unreachable(detail))) => {
                Err(StepError::Unavailable(format!("{}: {}", stage, detail)))
            }
            Ok(Err(GatewayError::Rejected { code, message })) => Err(StepError::Declined {
                intent_id: None,
                code: Some(code),
                detail: format!("{}: {}", stage, message),
            }),
            Err(_) => Err(StepError::Unavailable(format!("{} timed out", stage))),
        }
    }

    async fn run_pipeline(
        self: Arc<Self>,
        attempt_id: AttemptId,
        product_id: ProductId,
        method_id: PaymentMethodId,
    ) -> Result<(IntentId, Option<Receipt>), StepError> {
        let product = match timeout(self.config.provider_timeout, self.catalog.product(&product_id)).await {
            Ok(Ok(Some(product))) => product,
            Ok(Ok(None)) => return Err(StepError::ProductNotFound),
            Ok(Err(e)) => return Err(StepError::Unavailable(e.to_string())),
            Err(_) => return Err(StepError::Unavailable("catalog lookup timed out".to_string())),
        };

        // The session may have gone away while the catalog answered.
        self.directory
            .resolve_for_purchase(&method_id)
            .map_err(|e| StepError::MethodRevoked(e.0))?;

        let intent = PurchaseIntent::new(attempt_id, &product, method_id);
        self.update(&attempt_id, |a| a.attach_intent(intent.clone()));

        let intent_id = self
            .bounded("create_intent", self.gateway.create_intent(&intent))
            .await?;
        debug!(attempt_id = %attempt_id, intent_id = %intent_id, "Provider intent created");
        self.update(&attempt_id, |a| a.record_provider_intent(intent_id.clone()));

        let result = self
            .bounded("execute", self.gateway.execute(&intent_id))
            .await
            .map_err(|e| match e {
                StepError::Declined { code, detail, .. } => StepError::Declined {
                    intent_id: Some(intent_id.clone()),
                    code,
                    detail,
                },
                other => other,
            })?;

        match result.status {
            ExecutionStatus::Completed => Ok((intent_id, result.receipt)),
            ExecutionStatus::Failed => Err(StepError::Declined {
                intent_id: Some(intent_id),
                code: result.failure_code,
                detail: "execution failed".to_string(),
            }),
        }
    }

    fn update<F>(&self, attempt_id: &AttemptId, apply: F)
    where
        F: FnOnce(&mut PurchaseAttempt) -> Result<(), TransitionError>,
    {
        let mut ledger = self.ledger.lock();
        if let Some(attempt) = ledger.get_mut(attempt_id) {
            if let Err(e) = apply(attempt) {
                warn!(attempt_id = %attempt_id, error = %e, "Attempt update rejected");
            }
        }
    }

    /// Record the terminal state, release the claim, then announce it.
    fn conclude(
        &self,
        attempt_id: AttemptId,
        product_id: ProductId,
        method_id: PaymentMethodId,
        result: Result<(IntentId, Option<Receipt>), StepError>,
    ) -> Result<PurchaseReport, PurchaseError> {
        let now = self.clock.now();

        let (event, returned) = match result {
            Ok((intent_id, receipt)) => {
                self.finish(&attempt_id, &product_id, |a| a.succeed(receipt.clone(), now));
                info!(
                    attempt_id = %attempt_id,
                    product_id = %product_id,
                    intent_id = %intent_id,
                    "Purchase completed"
                );
                let event = StorefrontEvent::PaymentCompleted {
                    attempt_id,
                    product_id: product_id.clone(),
                    intent_id: intent_id.clone(),
                    receipt: receipt.clone(),
                };
                let report = PurchaseReport {
                    attempt_id,
                    product_id,
                    intent_id: Some(intent_id),
                    outcome: PurchaseOutcome::Succeeded { receipt },
                };
                (event, Ok(report))
            }
            Err(step) => {
                let reason = match &step {
                    StepError::Declined { .. } => FailureReason::Declined,
                    StepError::Unavailable(_) => FailureReason::ProviderUnavailable,
                    StepError::ProductNotFound => FailureReason::ProductUnavailable,
                    StepError::MethodRevoked(_) => FailureReason::MethodUnavailable,
                    StepError::Interrupted(_) => FailureReason::Interrupted,
                };
                self.finish(&attempt_id, &product_id, |a| a.fail(reason, now));
                warn!(
                    attempt_id = %attempt_id,
                    product_id = %product_id,
                    detail = ?step,
                    "Purchase failed"
                );
                let event = StorefrontEvent::PaymentFailed {
                    attempt_id,
                    product_id: product_id.clone(),
                    reason: reason.user_message().to_string(),
                };
                let returned = match step {
                    StepError::Declined { intent_id, .. } => Ok(PurchaseReport {
                        attempt_id,
                        product_id,
                        intent_id,
                        outcome: PurchaseOutcome::Failed { reason },
                    }),
                    StepError::ProductNotFound => Err(PurchaseError::ProductNotFound {
                        product_id,
                        attempt_id,
                    }),
                    StepError::MethodRevoked(reason) => Err(PurchaseError::InvalidSelection {
                        method_id,
                        reason,
                    }),
                    StepError::Unavailable(_) | StepError::Interrupted(_) => {
                        Err(PurchaseError::ProviderUnavailable { attempt_id })
                    }
                };
                (event, returned)
            }
        };

        self.publisher.publish(event);
        returned
    }

    fn finish<F>(&self, attempt_id: &AttemptId, product_id: &ProductId, apply: F)
    where
        F: FnOnce(&mut PurchaseAttempt) -> Result<(), TransitionError>,
    {
        let mut ledger = self.ledger.lock();
        if let Some(attempt) = ledger.get_mut(attempt_id) {
            if let Err(e) = apply(attempt) {
                warn!(attempt_id = %attempt_id, error = %e, "Attempt conclusion rejected");
            }
        }
        ledger.release(product_id, attempt_id);
        let evicted = ledger.evict_finished();
        if evicted > 0 {
            debug!(evicted, "Finished attempts evicted");
        }
    }
}

#[async_trait::async_trait]
impl PurchaseApi for PurchaseOrchestrator {
    async fn submit(
        &self,
        product_id: ProductId,
        method_id: PaymentMethodId,
    ) -> Result<PurchaseReport, PurchaseError> {
        let method = self
            .inner
            .directory
            .resolve_for_purchase(&method_id)
            .map_err(|e| {
                debug!(method_id = %method_id, reason = %e, "Payment method rejected");
                PurchaseError::InvalidSelection {
                    method_id: method_id.clone(),
                    reason: e.0,
                }
            })?;

        let mut attempt = PurchaseAttempt::new(product_id.clone(), method.id.clone(), self.inner.clock.now());
        let attempt_id = attempt.id();
        if let Err(e) = attempt.begin() {
            warn!(attempt_id = %attempt_id, error = %e, "Fresh attempt refused to begin");
            return Err(PurchaseError::ProviderUnavailable { attempt_id });
        }
        if let Err(existing) = self.inner.ledger.lock().claim(attempt) {
            debug!(product_id = %product_id, existing = %existing, "Duplicate submission rejected");
            return Err(PurchaseError::DuplicateSubmission { product_id });
        }

        info!(
            attempt_id = %attempt_id,
            product_id = %product_id,
            method_id = %method.id,
            rail = %method.rail(),
            "Purchase submitting"
        );
        self.inner.publisher.publish(StorefrontEvent::PaymentStarted {
            attempt_id,
            product_id: product_id.clone(),
            payment_method_id: method.id.clone(),
        });

        let inner = self.inner.clone();
        let task_product = product_id.clone();
        let handle = tokio::spawn(async move {
            let pipeline = tokio::spawn(inner.clone().run_pipeline(
                attempt_id,
                task_product.clone(),
                method.id.clone(),
            ));
            let result = match pipeline.await {
                Ok(result) => result,
                Err(e) => Err(StepError::Interrupted(e.to_string())),
            };
            inner.conclude(attempt_id, task_product, method.id, result)
        });

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!(attempt_id = %attempt_id, error = %e, "Purchase task aborted");
                Err(PurchaseError::ProviderUnavailable { attempt_id })
            }
        }
    }

    fn attempt(&self, id: &AttemptId) -> Option<PurchaseAttempt> {
        self.inner.ledger.lock().get(id).cloned()
    }

    fn in_flight(&self, product_id: &ProductId) -> Option<AttemptId> {
        self.inner.ledger.lock().in_flight(product_id)
    }

    fn attempts_for(&self, product_id: &ProductId) -> Vec<PurchaseAttempt> {
        self.inner.ledger.lock().attempts_for(product_id)
    }
}
