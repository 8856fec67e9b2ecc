//! Ports: the purchase API and the provider, catalog and method lookups it
//! depends on.

pub mod inbound;
pub mod outbound;
