pub mod driver;
pub mod generate;
pub mod job;
pub mod loader;
pub mod report;
pub mod snapshot;
pub mod stats;

pub use driver::{Evaluation, Sim, compare, run_policy};
pub use job::Job;
pub use loader::{LoadError, LoaderConfig};
pub use report::{ComparisonTable, Report};
pub use snapshot::Snapshot;
pub use stats::Stats;
