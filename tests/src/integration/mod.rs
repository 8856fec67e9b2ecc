//! # Integration Flows
//!
//! Fixtures shared by the flow tests: a sandbox storefront and an event log
//! that records what reached the bus, in publish order.

pub mod purchase_flow;
pub mod wallet_flow;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use shared_bus::{EventBus, EventTopic, EventStream, StorefrontEvent, Subscription};
    use shared_types::{Money, PaymentMethod, Product};
    use storefront_runtime::adapters::{InMemoryCatalog, SandboxPayments, SandboxWallet};
    use storefront_runtime::{Collaborators, StorefrontConfig, StorefrontContext};
    use tokio_stream::StreamExt;

    pub const PHANTOM_ADDRESS: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    pub struct Storefront {
        pub context: StorefrontContext,
        pub wallet: Arc<SandboxWallet>,
        pub payments: Arc<SandboxPayments>,
        pub catalog: Arc<InMemoryCatalog>,
    }

    /// Methods offered by the sandbox provider: a default card, PayPal and
    /// one crypto method per supported chain.
    pub fn methods() -> Vec<PaymentMethod> {
        vec![
            PaymentMethod::card("visa", "Visa", "4242").as_default(),
            PaymentMethod::paypal("paypal", "buyer@example.com"),
            PaymentMethod::crypto("eth", "Ether", "eth"),
            PaymentMethod::crypto("sol", "Solana", "sol"),
        ]
    }

    pub fn storefront() -> Storefront {
        storefront_with(StorefrontConfig::default())
    }

    pub fn storefront_with(config: StorefrontConfig) -> Storefront {
        let wallet = Arc::new(SandboxWallet::new().with_account("phantom", PHANTOM_ADDRESS, "sol"));
        let payments = Arc::new(SandboxPayments::new(methods()));
        let catalog = Arc::new(InMemoryCatalog::new([
            Product::new("p1", "Sword of Dawn", Money::usd_cents(1_250)),
            Product::new("p2", "Tower Deed", Money::usd_cents(123_450)),
        ]));
        let context = StorefrontContext::new(
            Collaborators {
                wallet: wallet.clone(),
                methods: payments.clone(),
                gateway: payments.clone(),
                catalog: catalog.clone(),
            },
            config,
        );
        Storefront {
            context,
            wallet,
            payments,
            catalog,
        }
    }

    /// Records every event on the given topics.
    pub struct EventLog {
        bus: Arc<EventBus>,
        events: Arc<Mutex<Vec<StorefrontEvent>>>,
        subscriptions: Vec<Subscription>,
    }

    impl EventLog {
        pub fn attach(bus: &Arc<EventBus>, topics: &[EventTopic]) -> Self {
            let events = Arc::new(Mutex::new(Vec::new()));
            let sink = events.clone();
            let subscriptions = bus.subscribe_all(topics, move |event| {
                sink.lock().push(event.clone());
                Ok(())
            });
            Self {
                bus: bus.clone(),
                events,
                subscriptions,
            }
        }

        pub fn all(bus: &Arc<EventBus>) -> Self {
            Self::attach(bus, &EventTopic::ALL)
        }

        pub fn events(&self) -> Vec<StorefrontEvent> {
            self.events.lock().clone()
        }

        pub fn topics(&self) -> Vec<&'static str> {
            self.events.lock().iter().map(|e| e.topic().name()).collect()
        }
    }

    impl Drop for EventLog {
        fn drop(&mut self) {
            for subscription in &self.subscriptions {
                self.bus.unsubscribe(subscription);
            }
        }
    }

    /// Next event from `stream`, failing the test after a second.
    pub async fn next_event(stream: &mut EventStream) -> StorefrontEvent {
        tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timed out waiting for event")
            .expect("event stream closed")
    }
}
