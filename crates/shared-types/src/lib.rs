//! # Shared Types Crate
//!
//! Domain entities used by every storefront component: wallet sessions,
//! payment methods, products, money and the identifiers that tie them
//! together.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Types that cross component boundaries live
//!   here and nowhere else.
//! - **Owned Snapshots**: Entities are plain `Clone` values. Components hand
//!   out copies; the owning component is the only writer of its state.
//! - **Shared Taxonomy**: Every component error maps onto [`ErrorKind`] so the
//!   UI layer can react without knowing which component failed.

pub mod entities;
pub mod errors;
pub mod format;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use format::{format_price, truncate_address};
pub use time::{ManualClock, SystemTimeSource, TimeSource, Timestamp};
