//! Ports: the manager's inbound API and the wallet provider it drives.

pub mod inbound;
pub mod outbound;
