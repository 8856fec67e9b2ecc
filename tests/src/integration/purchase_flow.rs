//! # Purchase Flow Tests
//!
//! ```text
//! [Wallet (1)] ──wallet/connected──→ [Event Bus] ──→ [Registry (2)] reselects
//!                                                          │
//!                               submit(product, selected) ─┘
//!                                          │
//!                                          ↓
//!                               [Purchase (3)] ──payment/started──→ [Event Bus]
//!                                          │
//!                     catalog → create_intent → execute
//!                                          │
//!                                          ↓
//!                        payment/completed | payment/failed ──→ [Event Bus]
//! ```
//!
//! ## Test Categories
//!
//! 1. **Happy Path**: connect, automatic crypto selection, purchase
//! 2. **Decline and Retry**: failed execution, fresh attempt afterwards
//! 3. **Concurrency**: duplicate submission, parallel products
//! 4. **Outages**: unreachable and hanging providers

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use shared_bus::{EventTopic, HandlerError, StorefrontEvent};
    use shared_types::{ErrorKind, IntentId, Money, PaymentMethodId, ProductId, Receipt, WalletKind};
    use sf_01_wallet_session::WalletSessionApi;
    use sf_02_payment_methods::PaymentMethodApi;
    use sf_03_purchase::{
        ExecutionResult, FailureReason, GatewayError, PurchaseApi, PurchaseError, PurchaseOutcome,
        PurchasePhase,
    };
    use storefront_runtime::StorefrontConfig;

    use crate::integration::fixtures::{next_event, storefront, storefront_with, EventLog};

    const DECLINED: &str = "Payment failed. Please try again.";
    const UNAVAILABLE: &str = "The payment service is temporarily unavailable. Please try again later.";

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    #[tokio::test]
    async fn test_connect_select_and_purchase() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        let log = EventLog::all(sf.context.bus());

        let session = sf.context.wallet().connect(WalletKind::new("ethereum")).await.unwrap();
        assert!(session.address.starts_with("0xabc"));
        assert_eq!(session.blockchain_id.as_str(), "eth");

        let selected = sf.context.registry().selected().unwrap();
        assert_eq!(selected.id, PaymentMethodId::new("eth"));

        let report = sf
            .context
            .purchases()
            .submit(ProductId::new("p1"), selected.id.clone())
            .await
            .unwrap();

        assert_eq!(report.intent_id, Some(IntentId::new("i1")));
        assert_eq!(
            report.outcome,
            PurchaseOutcome::Succeeded {
                receipt: Some(Receipt::new("r1"))
            }
        );
        assert_eq!(sf.payments.executed(), vec![IntentId::new("i1")]);

        let intents = sf.payments.intents();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].amount(), &Money::usd_cents(1_250));
        assert_eq!(intents[0].payment_method_id(), &PaymentMethodId::new("eth"));

        assert_eq!(
            log.topics(),
            vec!["wallet/connected", "payment/started", "payment/completed"]
        );
        match &log.events()[2] {
            StorefrontEvent::PaymentCompleted {
                receipt, intent_id, ..
            } => {
                assert_eq!(receipt, &Some(Receipt::new("r1")));
                assert_eq!(intent_id, &IntentId::new("i1"));
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let attempt = sf.context.purchases().attempt(&report.attempt_id).unwrap();
        assert_eq!(attempt.phase(), PurchasePhase::Succeeded);
        assert!(sf.context.purchases().in_flight(&ProductId::new("p1")).is_none());
    }

    #[tokio::test]
    async fn test_card_purchase_without_wallet() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();

        let selected = sf.context.registry().selected().unwrap();
        assert_eq!(selected.id, PaymentMethodId::new("visa"));

        let report = sf
            .context
            .purchases()
            .submit(ProductId::new("p2"), selected.id)
            .await
            .unwrap();
        assert!(report.succeeded());
        assert_eq!(sf.payments.intents()[0].amount(), &Money::usd_cents(123_450));
    }

    // =========================================================================
    // DECLINE AND RETRY
    // =========================================================================

    #[tokio::test]
    async fn test_decline_then_independent_retry() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        let log = EventLog::attach(
            sf.context.bus(),
            &[EventTopic::PaymentCompleted, EventTopic::PaymentFailed],
        );
        let product = ProductId::new("p1");
        let visa = PaymentMethodId::new("visa");

        sf.payments
            .script_execute(Ok(ExecutionResult::failed("card_declined: do_not_honor")));
        let declined = sf
            .context
            .purchases()
            .submit(product.clone(), visa.clone())
            .await
            .unwrap();

        assert_eq!(
            declined.outcome,
            PurchaseOutcome::Failed {
                reason: FailureReason::Declined
            }
        );
        let attempt = sf.context.purchases().attempt(&declined.attempt_id).unwrap();
        assert_eq!(attempt.phase(), PurchasePhase::Failed);

        match &log.events()[0] {
            StorefrontEvent::PaymentFailed { reason, .. } => {
                assert_eq!(reason, DECLINED);
                assert!(!reason.contains("do_not_honor"));
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let retry = sf.context.purchases().submit(product.clone(), visa).await.unwrap();
        assert!(retry.succeeded());
        assert_ne!(retry.attempt_id, declined.attempt_id);
        assert_eq!(retry.intent_id, Some(IntentId::new("i2")));
        assert_eq!(declined.intent_id, Some(IntentId::new("i1")));

        let intents = sf.payments.intents();
        assert_eq!(intents.len(), 2);
        assert_ne!(intents[0].attempt_id(), intents[1].attempt_id());

        let history = sf.context.purchases().attempts_for(&product);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].phase(), PurchasePhase::Failed);
        assert_eq!(history[1].phase(), PurchasePhase::Succeeded);
        assert_eq!(log.topics(), vec!["payment/failed", "payment/completed"]);
    }

    #[tokio::test]
    async fn test_subscriber_can_retry_from_failure_event() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        sf.payments.script_execute(Ok(ExecutionResult::failed("insufficient_funds")));

        // Claim must already be released when payment/failed is delivered.
        let observed = Arc::new(Mutex::new(None));
        let seen = observed.clone();
        let purchases = sf.context.purchases().clone();
        let _sub = sf.context.bus().subscribe(EventTopic::PaymentFailed, move |event| {
            if let Some(product_id) = event.product_id() {
                *seen.lock() = Some(purchases.in_flight(product_id));
            }
            Ok(())
        });

        let report = sf
            .context
            .purchases()
            .submit(ProductId::new("p1"), PaymentMethodId::new("visa"))
            .await
            .unwrap();
        assert!(!report.succeeded());
        assert_eq!(*observed.lock(), Some(None));
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    #[tokio::test]
    async fn test_duplicate_submission_while_submitting() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        let mut started = sf.context.bus().stream(&[EventTopic::PaymentStarted]);
        sf.payments.hold_execute();

        let first = {
            let purchases = sf.context.purchases().clone();
            tokio::spawn(async move {
                purchases
                    .submit(ProductId::new("p1"), PaymentMethodId::new("visa"))
                    .await
            })
        };
        next_event(&mut started).await;
        assert!(sf.context.purchases().in_flight(&ProductId::new("p1")).is_some());

        let duplicate = sf
            .context
            .purchases()
            .submit(ProductId::new("p1"), PaymentMethodId::new("paypal"))
            .await
            .unwrap_err();
        assert_eq!(
            duplicate,
            PurchaseError::DuplicateSubmission {
                product_id: ProductId::new("p1")
            }
        );
        assert_eq!(duplicate.kind(), ErrorKind::DuplicateSubmission);

        let second = {
            let purchases = sf.context.purchases().clone();
            tokio::spawn(async move {
                purchases
                    .submit(ProductId::new("p2"), PaymentMethodId::new("visa"))
                    .await
            })
        };
        next_event(&mut started).await;

        sf.payments.release_execute();
        let first = tokio::time::timeout(Duration::from_secs(1), first)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let second = tokio::time::timeout(Duration::from_secs(1), second)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert!(first.succeeded());
        assert!(second.succeeded());
        assert_ne!(first.intent_id, second.intent_id);
        assert_eq!(sf.payments.intents().len(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_during_catalog_lookup_blocks_crypto_intent() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        sf.context.wallet().connect(WalletKind::new("ethereum")).await.unwrap();
        let log = EventLog::attach(
            sf.context.bus(),
            &[
                EventTopic::PaymentStarted,
                EventTopic::PaymentCompleted,
                EventTopic::PaymentFailed,
            ],
        );
        sf.catalog.hold_lookups();

        let pending = {
            let purchases = sf.context.purchases().clone();
            tokio::spawn(async move {
                purchases
                    .submit(ProductId::new("p1"), PaymentMethodId::new("eth"))
                    .await
            })
        };
        tokio::time::timeout(Duration::from_secs(1), async {
            while sf.catalog.lookup_calls() == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        sf.context.wallet().disconnect().await.unwrap();
        assert_eq!(sf.context.registry().selected().map(|m| m.id), Some(PaymentMethodId::new("visa")));
        sf.catalog.release_lookups();

        let err = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .unwrap()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSelection);
        assert!(sf.payments.intents().is_empty());
        assert!(sf.payments.executed().is_empty());

        let attempts = sf.context.purchases().attempts_for(&ProductId::new("p1"));
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].phase(), PurchasePhase::Failed);
        assert!(attempts[0].intent().is_none());
        assert_eq!(
            attempts[0].outcome(),
            Some(&PurchaseOutcome::Failed {
                reason: FailureReason::MethodUnavailable
            })
        );
        assert_eq!(log.topics(), vec!["payment/started", "payment/failed"]);
        assert!(sf.context.purchases().in_flight(&ProductId::new("p1")).is_none());
    }

    // =========================================================================
    // OUTAGES
    // =========================================================================

    #[tokio::test]
    async fn test_unreachable_gateway_is_sanitized() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        let log = EventLog::attach(sf.context.bus(), &[EventTopic::PaymentFailed]);
        sf.payments
            .script_execute(Err(GatewayError::Unreachable("tls handshake with 10.0.0.7 failed".into())));

        let err = sf
            .context
            .purchases()
            .submit(ProductId::new("p1"), PaymentMethodId::new("visa"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
        assert!(!err.to_string().contains("10.0.0.7"));
        match &log.events()[0] {
            StorefrontEvent::PaymentFailed { reason, .. } => assert_eq!(reason, UNAVAILABLE),
            other => panic!("unexpected event: {:?}", other),
        }

        // Nothing retried automatically; a manual retry goes through.
        assert_eq!(sf.payments.executed().len(), 1);
        let retry = sf
            .context
            .purchases()
            .submit(ProductId::new("p1"), PaymentMethodId::new("visa"))
            .await
            .unwrap();
        assert!(retry.succeeded());
    }

    #[tokio::test]
    async fn test_hanging_gateway_times_out() {
        let mut config = StorefrontConfig::default();
        config.payments.provider_timeout_ms = 50;
        let sf = storefront_with(config);
        sf.context.registry().refresh().await.unwrap();
        let log = EventLog::attach(sf.context.bus(), &[EventTopic::PaymentFailed]);
        sf.payments.hold_execute();

        let err = tokio::time::timeout(
            Duration::from_secs(2),
            sf.context
                .purchases()
                .submit(ProductId::new("p1"), PaymentMethodId::new("visa")),
        )
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(err, PurchaseError::ProviderUnavailable { .. }));
        assert_eq!(log.topics(), vec!["payment/failed"]);
        assert!(sf.context.purchases().in_flight(&ProductId::new("p1")).is_none());
    }

    #[tokio::test]
    async fn test_unknown_product_and_catalog_outage() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();

        let err = sf
            .context
            .purchases()
            .submit(ProductId::new("missing"), PaymentMethodId::new("visa"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        sf.catalog.set_unreachable(true);
        let err = sf
            .context
            .purchases()
            .submit(ProductId::new("p1"), PaymentMethodId::new("visa"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
        assert!(sf.payments.intents().is_empty());
    }

    // =========================================================================
    // BUS BEHAVIOUR DURING A PURCHASE
    // =========================================================================

    #[tokio::test]
    async fn test_failing_subscribers_do_not_block_delivery() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        let bus = sf.context.bus();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let a = calls.clone();
        let _first = bus.subscribe(EventTopic::PaymentCompleted, move |_| {
            a.lock().push("first");
            Ok(())
        });
        let _erroring = bus.subscribe(EventTopic::PaymentCompleted, |_| {
            Err(HandlerError::Failed("analytics sink down".into()))
        });
        let _panicking = bus.subscribe(EventTopic::PaymentCompleted, |_| {
            panic!("subscriber bug");
        });
        let c = calls.clone();
        let _last = bus.subscribe(EventTopic::PaymentCompleted, move |_| {
            c.lock().push("last");
            Ok(())
        });

        let failures_before = bus.handler_failures();
        let report = sf
            .context
            .purchases()
            .submit(ProductId::new("p1"), PaymentMethodId::new("visa"))
            .await
            .unwrap();

        assert!(report.succeeded());
        assert_eq!(*calls.lock(), vec!["first", "last"]);
        assert_eq!(bus.handler_failures(), failures_before + 2);
    }
}
