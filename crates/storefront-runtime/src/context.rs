//! # Storefront Context
//!
//! One explicitly constructed value per process that owns the event bus and
//! the three storefront components. Nothing here is global.
//!
//! Construction order follows the dependency graph:
//!
//! 1. Event bus
//! 2. Payment method registry (subscribes to wallet events on the bus)
//! 3. Wallet session manager (publishes on the bus)
//! 4. Purchase orchestrator (resolves methods through the registry)

use std::sync::Arc;

use tracing::info;

use sf_01_wallet_session::{WalletProvider, WalletSessionManager};
use sf_02_payment_methods::{PaymentMethodRegistry, PaymentMethodSource};
use sf_03_purchase::{PaymentGateway, ProductCatalog, PurchaseOrchestrator};
use shared_bus::EventBus;
use shared_types::{SystemTimeSource, TimeSource};

use crate::adapters::RegistryDirectory;
use crate::config::StorefrontConfig;

/// External services the storefront talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub wallet: Arc<dyn WalletProvider>,
    pub methods: Arc<dyn PaymentMethodSource>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub catalog: Arc<dyn ProductCatalog>,
}

/// The wired storefront.
pub struct StorefrontContext {
    bus: Arc<EventBus>,
    wallet: WalletSessionManager,
    registry: Arc<PaymentMethodRegistry>,
    purchases: PurchaseOrchestrator,
    config: StorefrontConfig,
}

impl StorefrontContext {
    pub fn new(collaborators: Collaborators, config: StorefrontConfig) -> Self {
        Self::with_clock(collaborators, Arc::new(SystemTimeSource), config)
    }

    /// Construct with an explicit clock for session and attempt timestamps.
    pub fn with_clock(
        collaborators: Collaborators,
        clock: Arc<dyn TimeSource>,
        config: StorefrontConfig,
    ) -> Self {
        let bus = Arc::new(EventBus::new());

        let registry = Arc::new(PaymentMethodRegistry::new(
            collaborators.methods,
            bus.clone(),
            config.registry_config(),
        ));

        let wallet = WalletSessionManager::with_clock(
            collaborators.wallet,
            bus.clone(),
            clock.clone(),
            config.wallet_config(),
        );

        let purchases = PurchaseOrchestrator::with_clock(
            collaborators.gateway,
            collaborators.catalog,
            Arc::new(RegistryDirectory::new(registry.clone())),
            bus.clone(),
            clock,
            config.purchase_config(),
        );

        info!(
            connect_timeout_ms = config.wallet.connect_timeout_ms,
            refresh_timeout_ms = config.payments.refresh_timeout_ms,
            provider_timeout_ms = config.payments.provider_timeout_ms,
            "Storefront context ready"
        );

        Self {
            bus,
            wallet,
            registry,
            purchases,
            config,
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn wallet(&self) -> &WalletSessionManager {
        &self.wallet
    }

    pub fn registry(&self) -> &Arc<PaymentMethodRegistry> {
        &self.registry
    }

    pub fn purchases(&self) -> &PurchaseOrchestrator {
        &self.purchases
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }
}
