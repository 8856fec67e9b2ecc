//! # Adapter Implementations
//!
//! Concrete implementations of component outbound ports:
//!
//! - [`RegistryDirectory`]: the purchase orchestrator's `MethodDirectory`,
//!   answered by the payment method registry.
//! - [`sandbox`]: in-memory wallet, payment provider and catalog used by the
//!   demo binary and the integration tests.

pub mod method_directory;
pub mod sandbox;

pub use method_directory::RegistryDirectory;
pub use sandbox::{InMemoryCatalog, SandboxPayments, SandboxWallet};
