use std::{panic, thread};

use log::debug;

use super::{snapshot::Snapshot, stats::Stats};
use crate::{
    core::{EngineConfig, EngineError, Process, SchedCore, SchedCoreEvent},
    scheduler::{Fcfs, Policy, PolicyKind, Sjf},
};

/// One policy trial over its own copy of a workload.
pub struct Sim<P: Policy> {
    pub core: SchedCore<P>,
}

impl<P: Policy> Sim<P> {
    pub fn new(snapshot: &Snapshot, config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            core: SchedCore::<P>::new(snapshot.to_state()?, config),
        })
    }

    pub fn step(&mut self) -> Result<Vec<SchedCoreEvent>, EngineError> {
        self.core.step()
    }

    pub fn run(&mut self) -> Result<Stats, EngineError> {
        debug!(
            "{}: simulating {} processes",
            self.core.policy.name(),
            self.core.ctx.loaded()
        );
        let events = self.core.run()?;
        let stats = self.stats();
        debug!(
            "{}: finished at t={} after {} steps, {} events",
            self.core.policy.name(),
            stats.elapsed_time,
            self.core.observer().steps(),
            events.len()
        );
        Ok(stats)
    }

    pub fn stats(&self) -> Stats {
        Stats::collect(&self.core.ctx)
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.core.ctx.all_terminated()
    }

    /// Terminated processes in completion order.
    pub fn completed(&self) -> impl Iterator<Item = &Process> + '_ {
        self.core.ctx.terminated()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub policy: PolicyKind,
    pub stats: Stats,
}

pub fn run_policy(
    policy: PolicyKind,
    snapshot: &Snapshot,
    config: EngineConfig,
) -> Result<Evaluation, EngineError> {
    let stats = match policy {
        PolicyKind::Fcfs => Sim::<Fcfs>::new(snapshot, config)?.run()?,
        PolicyKind::Sjf => Sim::<Sjf>::new(snapshot, config)?.run()?,
    };
    Ok(Evaluation { policy, stats })
}

/// Run each policy against the same snapshot. Trials share nothing mutable,
/// so each one gets its own thread.
pub fn compare(
    snapshot: &Snapshot,
    policies: &[PolicyKind],
    config: EngineConfig,
) -> Result<Vec<Evaluation>, EngineError> {
    thread::scope(|scope| {
        let trials: Vec<_> = policies
            .iter()
            .map(|&policy| scope.spawn(move || run_policy(policy, snapshot, config)))
            .collect();

        trials
            .into_iter()
            .map(|trial| trial.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::Ticks, sim::Job};

    fn scenario() -> Snapshot {
        Snapshot::from_jobs(vec![Job::new(0, 0, 5), Job::new(1, 0, 3), Job::new(2, 0, 1)])
    }

    #[test]
    fn sim_steps_until_done() {
        let mut sim = Sim::<Fcfs>::new(&scenario(), EngineConfig::default()).unwrap();
        while !sim.all_jobs_completed() {
            sim.step().unwrap();
        }
        let order: Vec<_> = sim.completed().map(|proc| proc.pid).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(sim.stats().elapsed_time, 9);
    }

    #[test]
    fn compare_keeps_policy_order() {
        let evals = compare(&scenario(), &PolicyKind::ALL, EngineConfig::default()).unwrap();
        let policies: Vec<_> = evals.iter().map(|eval| eval.policy).collect();
        assert_eq!(policies, vec![PolicyKind::Fcfs, PolicyKind::Sjf]);

        let sequential = run_policy(PolicyKind::Sjf, &scenario(), EngineConfig::default()).unwrap();
        assert_eq!(evals[1], sequential);
    }

    #[test]
    fn invalid_snapshot_surfaces_engine_error() {
        let snapshot = Snapshot::from_jobs(vec![Job::new(0, 0, 0)]);
        assert!(matches!(
            run_policy(PolicyKind::Fcfs, &snapshot, EngineConfig::default()),
            Err(EngineError::ZeroBurst(0))
        ));
    }

    #[test]
    fn clock_past_tick_range_fails_the_trial() {
        let near_end = Ticks::MAX - 3;
        let jobs = vec![Job::new(0, near_end, 2), Job::new(1, near_end, 2)];
        let snapshot = Snapshot::from_jobs(jobs);
        assert!(matches!(
            run_policy(PolicyKind::Fcfs, &snapshot, EngineConfig::default()),
            Err(EngineError::ClockOverflow { .. })
        ));

        let snapshot = Snapshot::from_jobs(vec![Job::new(0, Ticks::MAX, 5)]);
        assert!(matches!(
            run_policy(PolicyKind::Sjf, &snapshot, EngineConfig::default()),
            Err(EngineError::CompletionOverflow { pid: 0, .. })
        ));
    }
}
