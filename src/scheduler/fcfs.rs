use super::{Decision, EngineState, Policy};

/// First-come-first-served. Ready is filled in arrival order, so its head
/// is always the earliest-arrived candidate.
pub struct Fcfs;

impl Policy for Fcfs {
    fn init(_ctx: &EngineState) -> Self {
        Self
    }

    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn select(&self, ctx: &EngineState) -> Decision {
        if ctx.running().is_some() {
            return Decision::KeepRunning;
        }

        match ctx.ready().next() {
            Some(proc) => Decision::Dispatch(proc.pid),
            None => Decision::Idle,
        }
    }
}
