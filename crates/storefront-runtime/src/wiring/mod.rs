//! # Wiring
//!
//! Bus subscribers owned by the runtime rather than by a component.
//!
//! ```text
//!   wallet session ──┐
//!   method registry ─┼──► EventBus ──► registry reselection (sf-02)
//!   purchases ───────┘        │
//!                             └──────► analytics (logs + Prometheus)
//! ```

pub mod analytics;

pub use analytics::Analytics;
