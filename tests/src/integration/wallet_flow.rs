//! # Wallet Flow Tests
//!
//! Session lifecycle and its effect on payment method selection:
//!
//! ```text
//! connect ──→ wallet/connected ──→ registry selects matching crypto method
//! switch  ──→ wallet/disconnected, wallet/connected ──→ reselect
//! disconnect ──→ wallet/disconnected ──→ crypto selection invalidated
//! ```

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared_bus::{EventTopic, StorefrontEvent};
    use shared_types::{ErrorKind, PaymentMethodId, ProductId, WalletKind};
    use sf_01_wallet_session::{ConnectionFailure, WalletError, WalletProviderError, WalletSessionApi};
    use sf_02_payment_methods::PaymentMethodApi;
    use sf_03_purchase::PurchaseApi;

    use crate::integration::fixtures::{next_event, storefront, EventLog, PHANTOM_ADDRESS};

    fn selected(sf: &crate::integration::fixtures::Storefront) -> Option<PaymentMethodId> {
        sf.context.registry().selected().map(|m| m.id)
    }

    #[tokio::test]
    async fn test_disconnect_invalidates_crypto_selection() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        sf.context.wallet().connect(WalletKind::new("ethereum")).await.unwrap();
        assert_eq!(selected(&sf), Some(PaymentMethodId::new("eth")));

        sf.context.wallet().disconnect().await.unwrap();
        assert!(sf.context.wallet().active_session().is_none());
        assert_eq!(selected(&sf), Some(PaymentMethodId::new("visa")));

        // A stale crypto id from the UI is refused before anything is published.
        let log = EventLog::all(sf.context.bus());
        let err = sf
            .context
            .purchases()
            .submit(ProductId::new("p1"), PaymentMethodId::new("eth"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSelection);
        assert!(log.events().is_empty());
        assert!(sf.payments.intents().is_empty());
    }

    #[tokio::test]
    async fn test_switching_wallets_tears_down_first() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        let log = EventLog::attach(sf.context.bus(), &EventTopic::WALLET);

        sf.context.wallet().connect(WalletKind::new("ethereum")).await.unwrap();
        let sol = sf.context.wallet().connect(WalletKind::new("phantom")).await.unwrap();

        assert_eq!(sol.address, PHANTOM_ADDRESS);
        assert_eq!(
            log.topics(),
            vec!["wallet/connected", "wallet/disconnected", "wallet/connected"]
        );
        match &log.events()[1] {
            StorefrontEvent::WalletDisconnected(session) => {
                assert_eq!(session.blockchain_id.as_str(), "eth");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(sf.wallet.disconnect_calls(), 1);
        assert_eq!(selected(&sf), Some(PaymentMethodId::new("sol")));
        assert_eq!(
            sf.context.registry().observed_session().map(|s| s.address),
            Some(PHANTOM_ADDRESS.to_string())
        );
    }

    #[tokio::test]
    async fn test_disconnect_without_session_publishes_nothing() {
        let sf = storefront();
        let log = EventLog::all(sf.context.bus());

        sf.context.wallet().disconnect().await.unwrap();

        assert!(log.events().is_empty());
        assert_eq!(sf.wallet.disconnect_calls(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_connect_leaves_no_session() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        let log = EventLog::all(sf.context.bus());
        sf.wallet.script_connect(Err(WalletProviderError::Cancelled));

        let err = sf
            .context
            .wallet()
            .connect(WalletKind::new("ethereum"))
            .await
            .unwrap_err();

        assert_eq!(err, WalletError::Connection(ConnectionFailure::Cancelled));
        assert_eq!(err.kind(), ErrorKind::ConnectionError);
        assert!(sf.context.wallet().active_session().is_none());
        assert!(log.events().is_empty());
        assert_eq!(selected(&sf), Some(PaymentMethodId::new("visa")));
    }

    #[tokio::test]
    async fn test_concurrent_connect_is_rejected() {
        let sf = storefront();
        sf.wallet.hold_connects();

        let pending = {
            let wallet = sf.context.wallet().clone();
            tokio::spawn(async move { wallet.connect(WalletKind::new("ethereum")).await })
        };
        tokio::time::timeout(Duration::from_secs(1), async {
            while !sf.context.wallet().is_connecting() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let err = sf
            .context
            .wallet()
            .connect(WalletKind::new("phantom"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationInProgress);

        sf.wallet.release_connects();
        let session = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(session.wallet_kind, WalletKind::new("ethereum"));
        assert!(!sf.context.wallet().is_connecting());
    }

    #[tokio::test]
    async fn test_abandoned_connect_still_lands_on_the_bus() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        let mut connected = sf.context.bus().stream(&[EventTopic::WalletConnected]);
        sf.wallet.hold_connects();

        // The caller gives up waiting; the provider call keeps going.
        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            sf.context.wallet().connect(WalletKind::new("ethereum")),
        )
        .await;
        assert!(abandoned.is_err());

        sf.wallet.release_connects();
        match next_event(&mut connected).await {
            StorefrontEvent::WalletConnected(session) => {
                assert_eq!(session.blockchain_id.as_str(), "eth");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(sf.context.wallet().active_session().is_some());
        assert_eq!(selected(&sf), Some(PaymentMethodId::new("eth")));
    }

    #[tokio::test]
    async fn test_account_change_keeps_selection() {
        let sf = storefront();
        sf.context.registry().refresh().await.unwrap();
        sf.context.wallet().connect(WalletKind::new("ethereum")).await.unwrap();
        let log = EventLog::all(sf.context.bus());

        let updated = sf
            .context
            .wallet()
            .change_account("0xdef0000000000000000000000000000000000002".to_string())
            .unwrap();

        assert_eq!(updated.short_address(), "0xdef0...0002");
        assert_eq!(log.topics(), vec!["wallet/account-changed"]);
        assert_eq!(selected(&sf), Some(PaymentMethodId::new("eth")));
        assert_eq!(
            sf.context.registry().observed_session().map(|s| s.address),
            Some(updated.address)
        );
    }
}
