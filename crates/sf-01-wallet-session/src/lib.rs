//! # Wallet Session Manager (SF-01)
//!
//! Owns the single active wallet connection of a client process.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): session slot and error taxonomy, no I/O
//! - **Ports Layer** (`ports/`): `WalletSessionApi` (inbound) and
//!   `WalletProvider` (outbound)
//! - **Service Layer** (`service.rs`): connect/disconnect orchestration,
//!   timeouts and bus announcements
//!
//! ## Events
//!
//! | Operation | Publishes |
//! |-----------|-----------|
//! | `connect` over an active session | `wallet/disconnected`, then `wallet/connected` |
//! | `connect` | `wallet/connected` |
//! | `disconnect` with a session | `wallet/disconnected` |
//! | `change_account` | `wallet/account-changed` |

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::{ConnectionFailure, WalletError};
pub use domain::session::SessionSlot;
pub use ports::inbound::WalletSessionApi;
pub use ports::outbound::{WalletConnection, WalletProvider, WalletProviderError};
pub use service::{WalletSessionConfig, WalletSessionManager};
