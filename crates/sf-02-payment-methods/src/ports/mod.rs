//! Ports: registry API and the provider's method listing.

pub mod inbound;
pub mod outbound;
