use super::{
    queue::QueueKind,
    state::{EngineState, ProcessState},
};

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &EngineState) {
        self.step += 1;
        if !cfg!(debug_assertions) {
            return;
        }

        if let Some(pid) = ctx.cpu {
            let proc = ctx.process(pid);
            debug_assert!(proc.is_some(), "cpu holds unknown pid:{pid}");
            if let Some(proc) = proc {
                debug_assert_eq!(
                    proc.state,
                    ProcessState::Running,
                    "cpu.current pid:{pid} must be Running"
                );
            }
            debug_assert_eq!(
                ctx.queues.location(pid),
                None,
                "Running pid:{pid} must not appear in any queue"
            );
        }

        for (pid, kind) in ctx.queues.members() {
            let Some(proc) = ctx.process(pid) else {
                debug_assert!(false, "{kind} references unknown pid:{pid}");
                continue;
            };
            let expected = match kind {
                QueueKind::Job => Some(ProcessState::New),
                QueueKind::Ready => Some(ProcessState::Ready),
                QueueKind::Terminated => Some(ProcessState::Terminated),
                QueueKind::Waiting => None,
            };
            if let Some(expected) = expected {
                debug_assert_eq!(proc.state, expected, "pid:{pid} in the {kind}");
            }
        }

        debug_assert_eq!(
            ctx.queues.member_counts(),
            QueueKind::ALL.map(|kind| ctx.queues.len(kind)),
            "membership out of sync with collection lengths"
        );

        let placed = ctx.queues.members().count() + usize::from(ctx.cpu.is_some());
        debug_assert_eq!(
            placed,
            ctx.loaded(),
            "every process must be in exactly one collection or on the CPU"
        );

        for proc in ctx.terminated() {
            debug_assert_eq!(proc.remaining_time, 0, "pid:{} terminated early", proc.pid);
            if let (Some(finish), Some(turnaround), Some(waiting)) =
                (proc.finish_time, proc.turnaround_time, proc.waiting_time)
            {
                debug_assert_eq!(turnaround, finish - proc.arrival_time);
                debug_assert_eq!(turnaround, waiting + proc.burst_time);
            } else {
                debug_assert!(false, "pid:{} terminated without timestamps", proc.pid);
            }
        }
    }
}
