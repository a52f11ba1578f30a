pub mod core;
pub mod scheduler;
pub mod sim;

pub use crate::core::{
    AdvanceMode, EngineConfig, EngineState, Process, SchedCore, SchedCoreEvent,
};
pub use scheduler::{Policy, PolicyKind};
pub use sim::{Job, Sim, Snapshot, Stats};
