//! Domain layer: method set, selection policy and registry state.

pub mod errors;
pub mod method_set;
pub mod selection;
pub mod state;
