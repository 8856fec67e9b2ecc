//! Domain layer: intents, attempts, the attempt ledger and failure reasons.

pub mod attempt;
pub mod errors;
pub mod intent;
pub mod ledger;
pub mod reason;
