//! Domain layer: session ownership rules and errors.

pub mod errors;
pub mod session;
