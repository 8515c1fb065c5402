//! Pipeline entry points for crawler operations.
//!
//! - `Visitor::visit`: Extract, merge and persist the reviews of one page
//! - `run_crawler`: Drive visits from the start URL until the goal is met

pub mod run;
pub mod visit;

pub use run::{STATISTICS_KEY, run_crawler};
pub use visit::{RunState, VisitOutcome, Visitor};
