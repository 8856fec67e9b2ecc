//! # Sandbox Collaborators
//!
//! In-memory stand-ins for the wallet, the payment provider and the catalog.
//! Responses can be scripted one call at a time; unscripted calls succeed.
//!
//! Gates (`hold_*`) park the next provider calls on a [`Notify`] until the
//! test releases them, which makes in-flight states observable without
//! sleeping.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::Notify;
use tracing::debug;

use sf_01_wallet_session::{WalletConnection, WalletProvider, WalletProviderError};
use sf_02_payment_methods::{MethodSourceError, PaymentMethodSource};
use sf_03_purchase::{
    CatalogError, ExecutionResult, GatewayError, PaymentGateway, ProductCatalog, PurchaseIntent,
};
use shared_types::{BlockchainId, IntentId, PaymentMethod, Product, ProductId, WalletKind};

async fn pass_gate(slot: &Mutex<Option<Arc<Notify>>>) {
    let Some(gate) = slot.lock().clone() else {
        return;
    };
    let notified = gate.notified();
    tokio::pin!(notified);
    notified.as_mut().enable();
    // Released between the clone and the registration.
    if slot.lock().is_none() {
        return;
    }
    notified.await;
}

// =============================================================================
// WALLET
// =============================================================================

/// Scriptable wallet provider.
///
/// Unscripted connects answer with the account registered for the wallet
/// kind, or with a fixed Ethereum account.
pub struct SandboxWallet {
    accounts: RwLock<HashMap<WalletKind, WalletConnection>>,
    connect_script: Mutex<VecDeque<Result<WalletConnection, WalletProviderError>>>,
    disconnect_script: Mutex<VecDeque<Result<(), WalletProviderError>>>,
    gate: Mutex<Option<Arc<Notify>>>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl SandboxWallet {
    pub const DEFAULT_ADDRESS: &'static str = "0xabc0000000000000000000000000000000000001";

    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            connect_script: Mutex::new(VecDeque::new()),
            disconnect_script: Mutex::new(VecDeque::new()),
            gate: Mutex::new(None),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }

    /// Account reported for `kind`.
    pub fn with_account(
        self,
        kind: impl Into<WalletKind>,
        address: impl Into<String>,
        chain: impl Into<BlockchainId>,
    ) -> Self {
        self.accounts.write().insert(
            kind.into(),
            WalletConnection {
                address: address.into(),
                blockchain_id: chain.into(),
            },
        );
        self
    }

    /// Answer the next connect with `response`.
    pub fn script_connect(&self, response: Result<WalletConnection, WalletProviderError>) {
        self.connect_script.lock().push_back(response);
    }

    /// Answer the next disconnect with `response`.
    pub fn script_disconnect(&self, response: Result<(), WalletProviderError>) {
        self.disconnect_script.lock().push_back(response);
    }

    /// Park connects until the returned gate is notified.
    pub fn hold_connects(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn release_connects(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.notify_waiters();
        }
    }

    pub fn connect_calls(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl Default for SandboxWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WalletProvider for SandboxWallet {
    async fn connect(&self, kind: &WalletKind) -> Result<WalletConnection, WalletProviderError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        pass_gate(&self.gate).await;

        if let Some(response) = self.connect_script.lock().pop_front() {
            return response;
        }
        let connection = self
            .accounts
            .read()
            .get(kind)
            .cloned()
            .unwrap_or_else(|| WalletConnection {
                address: Self::DEFAULT_ADDRESS.to_string(),
                blockchain_id: BlockchainId::new("eth"),
            });
        debug!(wallet_kind = %kind, address = %connection.address, "Sandbox wallet connected");
        Ok(connection)
    }

    async fn disconnect(&self) -> Result<(), WalletProviderError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.disconnect_script.lock().pop_front().unwrap_or(Ok(()))
    }
}

// =============================================================================
// PAYMENT PROVIDER
// =============================================================================

/// Scriptable payment provider: method listing plus intent gateway.
///
/// Unscripted intents are numbered `i1`, `i2`, ... and unscripted executions
/// complete with receipts `r1`, `r2`, ... in call order.
pub struct SandboxPayments {
    methods: RwLock<Vec<PaymentMethod>>,
    list_script: Mutex<VecDeque<Result<Vec<PaymentMethod>, MethodSourceError>>>,
    intent_script: Mutex<VecDeque<Result<IntentId, GatewayError>>>,
    execute_script: Mutex<VecDeque<Result<ExecutionResult, GatewayError>>>,
    gate: Mutex<Option<Arc<Notify>>>,
    intents: Mutex<Vec<PurchaseIntent>>,
    executed: Mutex<Vec<IntentId>>,
    next_intent: AtomicUsize,
    next_receipt: AtomicUsize,
}

impl SandboxPayments {
    pub fn new(methods: Vec<PaymentMethod>) -> Self {
        Self {
            methods: RwLock::new(methods),
            list_script: Mutex::new(VecDeque::new()),
            intent_script: Mutex::new(VecDeque::new()),
            execute_script: Mutex::new(VecDeque::new()),
            gate: Mutex::new(None),
            intents: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
            next_intent: AtomicUsize::new(0),
            next_receipt: AtomicUsize::new(0),
        }
    }

    /// Replace the methods returned by unscripted listings.
    pub fn set_methods(&self, methods: Vec<PaymentMethod>) {
        *self.methods.write() = methods;
    }

    pub fn script_list(&self, response: Result<Vec<PaymentMethod>, MethodSourceError>) {
        self.list_script.lock().push_back(response);
    }

    pub fn script_create_intent(&self, response: Result<IntentId, GatewayError>) {
        self.intent_script.lock().push_back(response);
    }

    pub fn script_execute(&self, response: Result<ExecutionResult, GatewayError>) {
        self.execute_script.lock().push_back(response);
    }

    /// Park `execute` calls until the returned gate is notified.
    pub fn hold_execute(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    /// Drop the gate and wake every parked `execute`.
    pub fn release_execute(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.notify_waiters();
        }
    }

    /// Intents received so far, in order.
    pub fn intents(&self) -> Vec<PurchaseIntent> {
        self.intents.lock().clone()
    }

    /// Intent ids passed to `execute`, in order.
    pub fn executed(&self) -> Vec<IntentId> {
        self.executed.lock().clone()
    }
}

#[async_trait::async_trait]
impl PaymentMethodSource for SandboxPayments {
    async fn list_methods(&self) -> Result<Vec<PaymentMethod>, MethodSourceError> {
        if let Some(response) = self.list_script.lock().pop_front() {
            return response;
        }
        Ok(self.methods.read().clone())
    }
}

#[async_trait::async_trait]
impl PaymentGateway for SandboxPayments {
    async fn create_intent(&self, intent: &PurchaseIntent) -> Result<IntentId, GatewayError> {
        self.intents.lock().push(intent.clone());
        if let Some(response) = self.intent_script.lock().pop_front() {
            return response;
        }
        let n = self.next_intent.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(IntentId::new(format!("i{}", n)))
    }

    async fn execute(&self, intent_id: &IntentId) -> Result<ExecutionResult, GatewayError> {
        pass_gate(&self.gate).await;
        self.executed.lock().push(intent_id.clone());

        if let Some(response) = self.execute_script.lock().pop_front() {
            return response;
        }
        let n = self.next_receipt.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ExecutionResult::completed(format!("r{}", n)))
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Catalog backed by a map. Can be switched to fail every lookup.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
    unreachable: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
    lookups: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        let catalog = Self::default();
        for product in products {
            catalog.insert(product);
        }
        catalog
    }

    pub fn insert(&self, product: Product) {
        self.products.write().insert(product.id.clone(), product);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Park lookups until [`release_lookups`](Self::release_lookups).
    pub fn hold_lookups(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn release_lookups(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.notify_waiters();
        }
    }

    /// Lookups started so far, parked ones included.
    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        pass_gate(&self.gate).await;
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(CatalogError::Unreachable("catalog offline".into()));
        }
        Ok(self.products.read().get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{AttemptId, Money};
    use std::time::Duration;

    #[tokio::test]
    async fn test_wallet_uses_registered_account_then_default() {
        let wallet = SandboxWallet::new().with_account("phantom", "So1anaAddr", "sol");

        let sol = wallet.connect(&WalletKind::new("phantom")).await.unwrap();
        assert_eq!(sol.blockchain_id, BlockchainId::new("sol"));

        let eth = wallet.connect(&WalletKind::new("metamask")).await.unwrap();
        assert_eq!(eth.address, SandboxWallet::DEFAULT_ADDRESS);
        assert_eq!(wallet.connect_calls(), 2);
    }

    #[tokio::test]
    async fn test_wallet_script_runs_once() {
        let wallet = SandboxWallet::new();
        wallet.script_connect(Err(WalletProviderError::Cancelled));

        let kind = WalletKind::new("ethereum");
        assert_eq!(wallet.connect(&kind).await, Err(WalletProviderError::Cancelled));
        assert!(wallet.connect(&kind).await.is_ok());
    }

    #[tokio::test]
    async fn test_gateway_numbers_intents_and_receipts() {
        let payments = SandboxPayments::new(vec![]);
        let product = Product::new("p1", "Sword", Money::usd_cents(500));
        let intent = PurchaseIntent::new(AttemptId::new(), &product, "visa".into());

        let id = payments.create_intent(&intent).await.unwrap();
        assert_eq!(id, IntentId::new("i1"));
        let result = payments.execute(&id).await.unwrap();
        assert_eq!(result, ExecutionResult::completed("r1"));
        assert_eq!(payments.executed(), vec![IntentId::new("i1")]);
        assert_eq!(payments.intents().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_gate_holds_until_released() {
        let payments = Arc::new(SandboxPayments::new(vec![]));
        payments.hold_execute();

        let parked = {
            let payments = payments.clone();
            tokio::spawn(async move { payments.execute(&IntentId::new("i1")).await })
        };
        tokio::task::yield_now().await;
        assert!(payments.executed().is_empty());

        payments.release_execute();
        let result = tokio::time::timeout(Duration::from_secs(1), parked)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_catalog_lookup_and_outage() {
        let catalog = InMemoryCatalog::new([Product::new("p1", "Sword", Money::usd_cents(500))]);

        assert!(catalog.product(&ProductId::new("p1")).await.unwrap().is_some());
        assert!(catalog.product(&ProductId::new("p2")).await.unwrap().is_none());

        catalog.set_unreachable(true);
        assert!(catalog.product(&ProductId::new("p1")).await.is_err());
    }
}
