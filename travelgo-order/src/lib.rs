pub mod ledger;
pub mod orchestrator;

pub use ledger::LedgerBook;
pub use orchestrator::{BookingOrchestrator, BookingPolicy};
