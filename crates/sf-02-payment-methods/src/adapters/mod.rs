//! # Adapters Module
//!
//! Infrastructure adapters wiring the registry to the event bus.

pub mod bus;
