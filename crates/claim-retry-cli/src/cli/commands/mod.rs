//! CLI command handlers, one per file.

mod classify;
mod delay;
mod history;
mod report;
mod simulate;

pub use classify::run_classify;
pub use delay::run_delay;
pub use history::run_history;
pub use report::run_report;
pub use simulate::{run_simulate, SimulateArgs};
