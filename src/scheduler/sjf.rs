use super::{Decision, EngineState, Policy};

/// Non-preemptive shortest-job-first. Ties go to the earlier arrival, then
/// the lower pid.
pub struct Sjf;

impl Policy for Sjf {
    fn init(_ctx: &EngineState) -> Self {
        Self
    }

    fn name(&self) -> &'static str {
        "SJF"
    }

    fn select(&self, ctx: &EngineState) -> Decision {
        if ctx.running().is_some() {
            return Decision::KeepRunning;
        }

        ctx.ready()
            .min_by_key(|proc| (proc.remaining_time, proc.arrival_time, proc.pid))
            .map_or(Decision::Idle, |proc| Decision::Dispatch(proc.pid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_break_on_arrival_then_pid() {
        let mut ctx = EngineState::new();
        ctx.load(5, 2, 3).unwrap();
        ctx.load(2, 1, 3).unwrap();
        ctx.load(1, 1, 3).unwrap();
        ctx.load(0, 0, 8).unwrap();
        ctx.advance_time(2).unwrap();
        ctx.admit_arrivals().unwrap();

        assert_eq!(Sjf.select(&ctx), Decision::Dispatch(1));
        ctx.set_running(1).unwrap();
        assert_eq!(Sjf.select(&ctx), Decision::KeepRunning);
    }

    #[test]
    fn idle_when_nothing_ready() {
        let ctx = EngineState::new();
        assert_eq!(Sjf.select(&ctx), Decision::Idle);
    }
}
