use log::trace;

use super::{
    event::SchedCoreEvent,
    observer::Observer,
    queue::QueueKind,
    state::{EngineError, EngineState, ProcessState, Ticks},
};
use crate::scheduler::{Decision, Policy};

/// How the clock moves while a process holds the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvanceMode {
    /// Jump straight to completion of the running process.
    #[default]
    Batch,
    /// One tick per step, consulting the policy every tick.
    UnitTick,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub advance: AdvanceMode,
}

pub struct SchedCore<P: Policy> {
    pub ctx: EngineState,
    pub policy: P,
    config: EngineConfig,
    observer: Observer,
}

impl<P: Policy> SchedCore<P> {
    pub fn new(ctx: EngineState, config: EngineConfig) -> Self {
        let policy = P::init(&ctx);
        Self {
            ctx,
            policy,
            config,
            observer: Observer::new(),
        }
    }

    /// One loop iteration: admit arrivals, let the policy pick, then either
    /// run the CPU or skip an idle gap to the next arrival.
    pub fn step(&mut self) -> Result<Vec<SchedCoreEvent>, EngineError> {
        let mut events = Vec::new();
        let now = self.ctx.now;

        for pid in self.ctx.admit_arrivals()? {
            events.push(SchedCoreEvent::StateChange {
                pid,
                from: ProcessState::New,
                to: ProcessState::Ready,
                at: now,
            });
        }

        match self.policy.select(&self.ctx) {
            Decision::Dispatch(pid) => {
                let from = self.ctx.set_running(pid)?;
                events.push(SchedCoreEvent::StateChange {
                    pid,
                    from,
                    to: ProcessState::Running,
                    at: now,
                });
            }
            Decision::KeepRunning | Decision::Idle => {}
        }

        match self.ctx.running().map(|proc| (proc.pid, proc.remaining_time)) {
            Some((pid, remaining)) => {
                let delta = match self.config.advance {
                    AdvanceMode::Batch => remaining,
                    AdvanceMode::UnitTick => 1,
                };
                if self.ctx.run_for(delta)? == 0 {
                    self.ctx.complete_running()?;
                    events.push(SchedCoreEvent::StateChange {
                        pid,
                        from: ProcessState::Running,
                        to: ProcessState::Terminated,
                        at: self.ctx.now,
                    });
                }
            }
            None => self.skip_idle(&mut events)?,
        }

        for event in &events {
            trace!("{} {:?}", self.policy.name(), event);
        }
        self.observer.observe(&self.ctx);
        Ok(events)
    }

    fn skip_idle(&mut self, events: &mut Vec<SchedCoreEvent>) -> Result<(), EngineError> {
        let next_arrival = self.ctx.queues.peek_earliest().map(|(_, arrival)| arrival);
        let ready = self.ctx.queues.len(QueueKind::Ready);

        match next_arrival {
            // Policy declined a non-empty Ready queue
            _ if ready > 0 => Err(self.stalled()),
            Some(until) => {
                let from = self.ctx.now;
                self.ctx.idle_until(until);
                events.push(SchedCoreEvent::CpuIdle { from, until });
                Ok(())
            }
            None if self.ctx.all_terminated() => Ok(()),
            None => Err(self.stalled()),
        }
    }

    fn stalled(&self) -> EngineError {
        EngineError::Stalled {
            now: self.ctx.now,
            ready: self.ctx.queues.len(QueueKind::Ready),
            waiting: self.ctx.queues.len(QueueKind::Waiting),
        }
    }

    /// Step until every loaded process has terminated. Returns the full
    /// event trace.
    pub fn run(&mut self) -> Result<Vec<SchedCoreEvent>, EngineError> {
        let mut trace = Vec::new();
        while !self.ctx.all_terminated() {
            trace.extend(self.step()?);
        }
        Ok(trace)
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
