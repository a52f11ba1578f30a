use crate::core::{Pid, ProcessState, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedCoreEvent {
    StateChange {
        pid: Pid,
        from: ProcessState,
        to: ProcessState,
        at: Ticks,
    },
    // CPU idle with nothing ready; clock jumps to the next arrival
    CpuIdle {
        from: Ticks,
        until: Ticks,
    },
}
