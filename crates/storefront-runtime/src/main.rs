//! # Storefront Runtime
//!
//! Runs one storefront session against the sandbox collaborators:
//!
//! 1. Refresh payment methods (a card is the provider default)
//! 2. Connect an Ethereum wallet (the registry switches to the ETH method)
//! 3. Buy an item with the selected method
//! 4. Buy a second item; the provider declines, the retry succeeds
//! 5. Disconnect and print the Prometheus metrics
//!
//! ## Configuration
//!
//! `storefront-runtime [CONFIG.toml]`, or set `SF_CONFIG`. Without a file the
//! defaults apply. `SF_*` variables override either (see `config.rs`).

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use sf_01_wallet_session::WalletSessionApi;
use sf_02_payment_methods::PaymentMethodApi;
use sf_03_purchase::{ExecutionResult, PurchaseApi, PurchaseOutcome};
use shared_types::{format_price, Money, PaymentMethod, Product, WalletKind};
use storefront_runtime::adapters::{InMemoryCatalog, SandboxPayments, SandboxWallet};
use storefront_runtime::{Analytics, Collaborators, StorefrontConfig, StorefrontContext};
use storefront_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};

fn load_config() -> Result<StorefrontConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SF_CONFIG").ok());

    match path {
        Some(path) => {
            info!(path = %path, "Loading configuration");
            StorefrontConfig::load(&path).with_context(|| format!("loading {}", path))
        }
        None => StorefrontConfig::from_env().context("reading configuration from environment"),
    }
}

fn sandbox() -> (Collaborators, Arc<SandboxPayments>, Vec<Product>) {
    let products = vec![
        Product::new("sword-of-dawn", "Sword of Dawn", Money::usd_cents(1_250)),
        Product::new("tower-deed", "Tower Deed", Money::usd_cents(123_450)),
    ];
    let payments = Arc::new(SandboxPayments::new(vec![
        PaymentMethod::card("visa-4242", "Visa", "4242").as_default(),
        PaymentMethod::paypal("paypal", "buyer@example.com"),
        PaymentMethod::crypto("eth-mainnet", "Ether", "eth"),
    ]));
    let collaborators = Collaborators {
        wallet: Arc::new(SandboxWallet::new()),
        methods: payments.clone(),
        gateway: payments.clone(),
        catalog: Arc::new(InMemoryCatalog::new(products.clone())),
    };
    (collaborators, payments, products)
}

fn describe(outcome: &PurchaseOutcome) -> String {
    match outcome {
        PurchaseOutcome::Processing => "processing".to_string(),
        PurchaseOutcome::Succeeded { receipt } => match receipt {
            Some(receipt) => format!("succeeded (receipt {})", receipt),
            None => "succeeded".to_string(),
        },
        PurchaseOutcome::Failed { reason } => format!("failed: {}", reason.user_message()),
    }
}

async fn buy(context: &StorefrontContext, product: &Product) -> Result<()> {
    let method = context
        .registry()
        .selected()
        .context("no payment method selected")?;
    info!(
        product_id = %product.id,
        price = %format_price(&product.price),
        method = %method.label,
        "Submitting purchase"
    );

    match context.purchases().submit(product.id.clone(), method.id).await {
        Ok(report) => {
            info!(attempt_id = %report.attempt_id, outcome = %describe(&report.outcome), "Purchase settled");
        }
        Err(e) => {
            warn!(product_id = %product.id, error = %e, "Purchase failed: {}", e.kind().user_message());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config = load_config()?;
    let (collaborators, payments, products) = sandbox();
    let context = StorefrontContext::new(collaborators, config);
    let analytics = Analytics::attach(context.bus().clone());

    let methods = context.registry().refresh().await?;
    info!(
        count = methods.len(),
        selected = ?context.registry().selected().map(|m| m.label),
        "Payment methods loaded"
    );

    let session = context.wallet().connect(WalletKind::new("ethereum")).await?;
    info!(
        address = %session.short_address(),
        selected = ?context.registry().selected().map(|m| m.label),
        "Wallet ready"
    );

    buy(&context, &products[0]).await?;

    payments.script_execute(Ok(ExecutionResult::failed("insufficient_funds")));
    buy(&context, &products[1]).await?;
    buy(&context, &products[1]).await?;

    for product in &products {
        let attempts = context.purchases().attempts_for(&product.id);
        info!(product_id = %product.id, attempts = attempts.len(), "Attempt history");
    }

    context.wallet().disconnect().await?;

    let tally = analytics.tally();
    info!(
        started = tally.started,
        completed = tally.completed,
        failed = tally.failed,
        "Session finished"
    );

    println!("{}", encode_metrics()?);
    Ok(())
}
