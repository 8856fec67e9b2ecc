//! # Payment Method Registry (SF-02)
//!
//! Caches the payment methods offered by the provider and keeps a current
//! selection that follows the active wallet session.
//!
//! ## Default Selection
//!
//! 1. A crypto method on the chain of the active wallet session
//! 2. Else the first method the provider flags as default
//! 3. Else nothing
//!
//! The registry subscribes to the wallet topics when it is built and
//! recomputes the selection on every connect and disconnect, so a crypto
//! method never stays selected once its wallet is gone.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::{RegistryError, SelectionRejection};
pub use domain::method_set::PaymentMethodSet;
pub use domain::selection::{check_usable, default_selection};
pub use ports::inbound::PaymentMethodApi;
pub use ports::outbound::{MethodSourceError, PaymentMethodSource};
pub use service::{PaymentMethodRegistry, RegistryConfig};
