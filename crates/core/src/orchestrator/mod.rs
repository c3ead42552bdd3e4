//! Search orchestrator.
//!
//! A run checks the configured paths, reads the last-run timestamp, applies
//! the frequency gate, narrows the age window to the time since the last run,
//! then queries every search term in file order, saving the results of each
//! before moving on. Failed terms are reported and skipped. The run's start
//! time becomes the new last-run timestamp once every term was processed.

mod runner;
mod types;

pub use runner::SearchOrchestrator;
pub use types::{RunError, RunOutcome, RunReport, TermOutcome, TermReport};
