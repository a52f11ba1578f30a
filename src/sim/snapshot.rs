use super::job::Job;
use crate::core::{EngineError, EngineState};

/// Plain-value copy of an initial workload, used to start every trial from
/// identical conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    jobs: Vec<Job>,
}

impl Snapshot {
    /// Build a snapshot from loaded jobs, ordered by arrival then pid.
    pub fn from_jobs(mut jobs: Vec<Job>) -> Self {
        jobs.sort_by_key(|job| (job.arrival_time, job.pid));
        Self { jobs }
    }

    /// Capture the input-derived fields of everything still in the Job
    /// collection. Simulation timestamps are never copied.
    pub fn capture(ctx: &EngineState) -> Self {
        let jobs = ctx
            .queues
            .jobs()
            .into_iter()
            .filter_map(|pid| ctx.process(pid))
            .map(|proc| Job::new(proc.pid, proc.arrival_time, proc.burst_time))
            .collect();
        Self { jobs }
    }

    /// Clear all collections of `ctx` and rebuild Job from this snapshot.
    pub fn restore(&self, ctx: &mut EngineState) -> Result<(), EngineError> {
        ctx.clear();
        for job in &self.jobs {
            ctx.load(job.pid, job.arrival_time, job.burst_time)?;
        }
        Ok(())
    }

    pub fn to_state(&self) -> Result<EngineState, EngineError> {
        let mut ctx = EngineState::new();
        self.restore(&mut ctx)?;
        Ok(ctx)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
