// Adapters layer: concrete implementations of the domain ports.

pub mod ledger;

pub use ledger::{JsonlLedger, MemoryLedger, LEDGER_FILE_NAME};
