//! # Shared Bus - Storefront Event Bus
//!
//! Decouples the wallet, payment-method and purchase components. Producers
//! publish [`StorefrontEvent`]s; consumers (the method registry, UI,
//! analytics) register handlers per [`EventTopic`].
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Wallet / Buy │                    │ Registry, UI │
//! │              │    publish()       │  analytics   │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Guarantees
//!
//! - Handlers of one topic run in subscription order.
//! - A failing or panicking handler is logged and skipped; the rest still run.
//! - `unsubscribe` is idempotent.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventTopic, StorefrontEvent, UnknownTopic};
pub use publisher::{EventBus, EventPublisher};
pub use subscriber::{EventHandler, EventStream, HandlerError, Subscription, SubscriptionId};
