pub mod driver;
pub mod event;
pub mod observer;
pub mod queue;
pub mod state;

pub use driver::{AdvanceMode, EngineConfig, SchedCore};
pub use event::SchedCoreEvent;
pub use queue::{QueueError, QueueKind, QueueSet};
pub use state::{EngineError, EngineState, Pid, Process, ProcessState, Ticks};
