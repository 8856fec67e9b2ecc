//! # Storefront Test Suite
//!
//! Cross-component flows driven through a real `StorefrontContext` with the
//! sandbox collaborators.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── mod.rs            # Fixtures: sandbox storefront, event log
//!     ├── purchase_flow.rs  # Submit, decline, retry, duplicates, outages
//!     └── wallet_flow.rs    # Connect, disconnect, reselection
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sf-tests
//! cargo test -p sf-tests integration::purchase_flow::
//! ```

#![allow(dead_code)]

pub mod integration;
