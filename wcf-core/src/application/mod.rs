// wcf-core/src/application/mod.rs

pub mod executor;
pub mod export;
pub mod flattener;
pub mod planner;

pub use executor::{CancellationToken, Executor};
pub use export::CoreExport;
pub use flattener::ChildRunbookFlattener;
pub use planner::Planner;
