//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `ProductId`, `PaymentMethodId`, `BlockchainId`, `WalletKind`,
//!   `IntentId`, `Receipt`, `AttemptId`
//! - **Wallet**: `WalletSession`
//! - **Payments**: `PaymentMethod`, `PaymentRail`, `RailDetails`
//! - **Catalog**: `Product`, `Money`, `CurrencyCode`

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::format::truncate_address;
use crate::time::Timestamp;

// =============================================================================
// CLUSTER A: IDENTIFIERS
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Catalog identifier of a purchasable asset.
    ProductId
);

string_id!(
    /// Provider-assigned identifier of a payment method.
    PaymentMethodId
);

string_id!(
    /// Chain a wallet or crypto payment method operates on (e.g. `eth`).
    BlockchainId
);

string_id!(
    /// Kind of wallet the user asked to connect (e.g. `ethereum`).
    WalletKind
);

string_id!(
    /// Intent identifier assigned by the payment provider.
    IntentId
);

string_id!(
    /// Proof of payment returned by the provider on success.
    Receipt
);

/// Locally generated identifier of one purchase attempt.
///
/// A retry is a new attempt and therefore gets a new `AttemptId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Generate a fresh attempt id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// CLUSTER B: WALLET
// =============================================================================

/// The single active wallet connection of a client.
///
/// Owned by the wallet session manager; every other component only ever
/// holds a copy received through the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    /// Account address reported by the wallet.
    pub address: String,
    /// Chain the wallet is connected to.
    pub blockchain_id: BlockchainId,
    /// Wallet kind the user picked.
    pub wallet_kind: WalletKind,
    /// When the connection was established (ms since Unix epoch).
    pub connected_at: Timestamp,
}

impl WalletSession {
    /// Address shortened for display, e.g. `0x1234...abcd`.
    pub fn short_address(&self) -> String {
        truncate_address(&self.address)
    }

    /// Whether this session is on the given chain.
    pub fn is_on(&self, chain: &BlockchainId) -> bool {
        &self.blockchain_id == chain
    }
}

// =============================================================================
// CLUSTER C: PAYMENTS
// =============================================================================

/// Payment rail a method settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentRail {
    /// On-chain payment from a connected wallet.
    Crypto,
    /// Card processor.
    Card,
    /// PayPal account.
    Paypal,
    /// Bank transfer.
    BankTransfer,
}

impl PaymentRail {
    /// Wire name of the rail.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Card => "card",
            Self::Paypal => "paypal",
            Self::BankTransfer => "bank_transfer",
        }
    }
}

impl fmt::Display for PaymentRail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rail-specific data attached to a payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RailDetails {
    /// On-chain payment. Only usable while a wallet on `blockchain_id` is connected.
    Crypto { blockchain_id: BlockchainId },
    /// Saved card.
    Card { brand: String, last4: String },
    /// PayPal account.
    Paypal { email: String },
    /// Bank transfer.
    BankTransfer { bank_name: String },
}

impl RailDetails {
    /// The rail these details belong to.
    pub fn rail(&self) -> PaymentRail {
        match self {
            Self::Crypto { .. } => PaymentRail::Crypto,
            Self::Card { .. } => PaymentRail::Card,
            Self::Paypal { .. } => PaymentRail::Paypal,
            Self::BankTransfer { .. } => PaymentRail::BankTransfer,
        }
    }
}

/// A payment method offered by the payment provider.
///
/// The rail is derived from `details`, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Unique id within the provider's list.
    pub id: PaymentMethodId,
    /// Human readable label ("Visa ending 4242").
    pub label: String,
    /// Whether the provider flags this method as the default.
    #[serde(default)]
    pub is_default: bool,
    /// Rail-specific details.
    pub details: RailDetails,
}

impl PaymentMethod {
    /// Create a method from its details.
    pub fn new(id: impl Into<PaymentMethodId>, label: impl Into<String>, details: RailDetails) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            is_default: false,
            details,
        }
    }

    /// Crypto method settling on `chain`.
    pub fn crypto(
        id: impl Into<PaymentMethodId>,
        label: impl Into<String>,
        chain: impl Into<BlockchainId>,
    ) -> Self {
        Self::new(
            id,
            label,
            RailDetails::Crypto {
                blockchain_id: chain.into(),
            },
        )
    }

    /// Card method.
    pub fn card(
        id: impl Into<PaymentMethodId>,
        brand: impl Into<String>,
        last4: impl Into<String>,
    ) -> Self {
        let brand = brand.into();
        let last4 = last4.into();
        let label = format!("{} ending {}", brand, last4);
        Self::new(id, label, RailDetails::Card { brand, last4 })
    }

    /// PayPal method.
    pub fn paypal(id: impl Into<PaymentMethodId>, email: impl Into<String>) -> Self {
        Self::new(
            id,
            "PayPal",
            RailDetails::Paypal {
                email: email.into(),
            },
        )
    }

    /// Mark as the provider default.
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// The rail this method settles on.
    pub fn rail(&self) -> PaymentRail {
        self.details.rail()
    }

    /// Chain of a crypto method, `None` for every other rail.
    pub fn crypto_chain(&self) -> Option<&BlockchainId> {
        match &self.details {
            RailDetails::Crypto { blockchain_id } => Some(blockchain_id),
            _ => None,
        }
    }

    /// Whether a crypto method can be paid from `session`.
    pub fn matches_session(&self, session: &WalletSession) -> bool {
        self.crypto_chain()
            .is_some_and(|chain| session.is_on(chain))
    }
}

// =============================================================================
// CLUSTER D: CATALOG
// =============================================================================

/// Invalid ISO 4217 style currency code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid currency code: {0:?}")]
pub struct CurrencyError(pub String);

/// Three-letter uppercase currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a code. Lowercase input is accepted and normalized.
    pub fn new(code: &str) -> Result<Self, CurrencyError> {
        let normalized = code.trim().to_ascii_uppercase();
        if normalized.len() != 3 || !normalized.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError(code.to_string()));
        }
        Ok(Self(normalized))
    }

    /// US dollar.
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// The code, e.g. `USD`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of decimal digits in the minor unit.
    pub fn minor_unit_digits(&self) -> u32 {
        match self.0.as_str() {
            "JPY" | "KRW" | "VND" | "CLP" | "ISK" => 0,
            _ => 2,
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Amount in the currency's minor unit (cents for USD).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub amount_minor: u64,
    pub currency: CurrencyCode,
}

impl Money {
    pub fn new(amount_minor: u64, currency: CurrencyCode) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Shorthand for a USD amount in cents.
    pub fn usd_cents(cents: u64) -> Self {
        Self::new(cents, CurrencyCode::usd())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::format_price(self))
    }
}

/// A listed asset, as returned by the product catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Money,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth_session() -> WalletSession {
        WalletSession {
            address: "0xabc0000000000000000000000000000000000def".into(),
            blockchain_id: "eth".into(),
            wallet_kind: "ethereum".into(),
            connected_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_rail_is_derived_from_details() {
        let method = PaymentMethod::crypto("pm-eth", "Ether", "eth");
        assert_eq!(method.rail(), PaymentRail::Crypto);
        assert_eq!(method.crypto_chain(), Some(&BlockchainId::new("eth")));

        let card = PaymentMethod::card("pm-card", "Visa", "4242");
        assert_eq!(card.rail(), PaymentRail::Card);
        assert_eq!(card.label, "Visa ending 4242");
        assert!(card.crypto_chain().is_none());
    }

    #[test]
    fn test_matches_session_only_for_same_chain() {
        let session = eth_session();
        assert!(PaymentMethod::crypto("a", "Ether", "eth").matches_session(&session));
        assert!(!PaymentMethod::crypto("b", "Sol", "sol").matches_session(&session));
        assert!(!PaymentMethod::card("c", "Visa", "4242").matches_session(&session));
    }

    #[test]
    fn test_currency_code_normalizes_and_validates() {
        assert_eq!(CurrencyCode::new("usd").unwrap().as_str(), "USD");
        assert!(CurrencyCode::new("US").is_err());
        assert!(CurrencyCode::new("U5D").is_err());
        assert_eq!(CurrencyCode::new("JPY").unwrap().minor_unit_digits(), 0);
    }

    #[test]
    fn test_payment_method_wire_format() {
        let json = r#"{
            "id": "pm-eth",
            "label": "Ether",
            "is_default": false,
            "details": { "type": "crypto", "blockchain_id": "eth" }
        }"#;
        let method: PaymentMethod = serde_json::from_str(json).unwrap();
        assert_eq!(method.id.as_str(), "pm-eth");
        assert_eq!(method.rail(), PaymentRail::Crypto);
    }

    #[test]
    fn test_money_rejects_bad_currency_on_deserialize() {
        let bad = r#"{ "amount_minor": 100, "currency": "dollars" }"#;
        assert!(serde_json::from_str::<Money>(bad).is_err());
    }

    #[test]
    fn test_attempt_ids_are_unique() {
        assert_ne!(AttemptId::new(), AttemptId::new());
    }
}
