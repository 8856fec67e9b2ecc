//! # Storefront Runtime
//!
//! Wires the storefront components into a [`StorefrontContext`]:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      StorefrontContext                        │
//! │                                                               │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐   │
//! │  │ sf-01 Wallet │   │ sf-02 Method │◄──│ sf-03 Purchase   │   │
//! │  │   Session    │   │   Registry   │   │  Orchestrator    │   │
//! │  └──────┬───────┘   └──────▲───────┘   └────────┬─────────┘   │
//! │         │ publish          │ wallet/*           │ publish     │
//! │         ▼                  │                    ▼             │
//! │  ┌─────────────────────────┴─────────────────────────────┐    │
//! │  │                     EventBus                          │    │
//! │  └─────────────────────────┬─────────────────────────────┘    │
//! │                            ▼                                  │
//! │                 analytics (logs + metrics)                    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! External services plug in through [`Collaborators`]; the
//! [`adapters::sandbox`] module provides in-memory ones.

pub mod adapters;
pub mod config;
pub mod context;
pub mod wiring;

pub use config::{ConfigError, StorefrontConfig};
pub use context::{Collaborators, StorefrontContext};
pub use wiring::Analytics;
