use std::{error::Error, fmt};

use rustc_hash::FxHashMap;

use super::queue::{QueueError, QueueKind, QueueSet};

pub type Pid = u64;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    New,
    Ready,
    Running,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: Pid,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub remaining_time: Ticks,
    pub state: ProcessState,
    pub start_time: Option<Ticks>,
    pub finish_time: Option<Ticks>,
    pub response_time: Option<Ticks>,
    pub waiting_time: Option<Ticks>,
    pub turnaround_time: Option<Ticks>,
}

impl Process {
    pub fn new(pid: Pid, arrival_time: Ticks, burst_time: Ticks) -> Self {
        Self {
            pid,
            arrival_time,
            burst_time,
            remaining_time: burst_time,
            state: ProcessState::New,
            start_time: None,
            finish_time: None,
            response_time: None,
            waiting_time: None,
            turnaround_time: None,
        }
    }
}

#[derive(Debug)]
pub enum EngineError {
    Queue(QueueError),
    DuplicatePid(Pid),
    ZeroBurst(Pid),
    CompletionOverflow { pid: Pid, arrival: Ticks, burst: Ticks },
    ClockOverflow { now: Ticks, delta: Ticks },
    UnknownProcess(Pid),
    CpuBusy { running: Pid, requested: Pid },
    NothingRunning,
    Unfinished { pid: Pid, remaining: Ticks },
    Stalled { now: Ticks, ready: usize, waiting: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EngineError::Queue(err) => write!(f, "queue operation rejected: {err}"),
            EngineError::DuplicatePid(pid) => write!(f, "pid:{pid} loaded twice"),
            EngineError::ZeroBurst(pid) => write!(f, "pid:{pid} has a zero burst time"),
            EngineError::CompletionOverflow {
                pid,
                arrival,
                burst,
            } => write!(
                f,
                "pid:{pid} (arrival {arrival}, burst {burst}) finishes past the tick range"
            ),
            EngineError::ClockOverflow { now, delta } => {
                write!(f, "clock at t={now} cannot advance by {delta} ticks")
            }
            EngineError::UnknownProcess(pid) => write!(f, "pid:{pid} is not in the process table"),
            EngineError::CpuBusy { running, requested } => write!(
                f,
                "cannot dispatch pid:{requested} while pid:{running} holds the CPU"
            ),
            EngineError::NothingRunning => write!(f, "no process is running"),
            EngineError::Unfinished { pid, remaining } => write!(
                f,
                "pid:{pid} cannot terminate with {remaining} ticks remaining"
            ),
            EngineError::Stalled {
                now,
                ready,
                waiting,
            } => write!(
                f,
                "simulation stalled at t={now} ({ready} ready, {waiting} waiting, no arrivals left)"
            ),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::Queue(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QueueError> for EngineError {
    fn from(err: QueueError) -> Self {
        EngineError::Queue(err)
    }
}

/// Everything one simulation trial owns: the clock, the single CPU slot,
/// the process table and the life-cycle collections.
#[derive(Debug, Default)]
pub struct EngineState {
    pub now: Ticks,
    pub cpu: Option<Pid>,
    pub procs: FxHashMap<Pid, Process>,
    pub queues: QueueSet,
    pub idle_time: Ticks,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a New process and seed it into the Job collection.
    pub fn load(
        &mut self,
        pid: Pid,
        arrival_time: Ticks,
        burst_time: Ticks,
    ) -> Result<(), EngineError> {
        if burst_time == 0 {
            return Err(EngineError::ZeroBurst(pid));
        }
        if self.procs.contains_key(&pid) {
            return Err(EngineError::DuplicatePid(pid));
        }
        if arrival_time.checked_add(burst_time).is_none() {
            return Err(EngineError::CompletionOverflow {
                pid,
                arrival: arrival_time,
                burst: burst_time,
            });
        }

        self.queues.push_job(pid, arrival_time)?;
        self.procs.insert(pid, Process::new(pid, arrival_time, burst_time));
        Ok(())
    }

    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.procs.get(&pid)
    }

    fn process_mut(&mut self, pid: Pid) -> Result<&mut Process, EngineError> {
        self.procs
            .get_mut(&pid)
            .ok_or(EngineError::UnknownProcess(pid))
    }

    pub fn loaded(&self) -> usize {
        self.procs.len()
    }

    /// Ready processes in queue order.
    pub fn ready(&self) -> impl Iterator<Item = &Process> + '_ {
        self.queues
            .ready()
            .filter_map(move |pid| self.procs.get(&pid))
    }

    /// Terminated processes in completion order.
    pub fn terminated(&self) -> impl Iterator<Item = &Process> + '_ {
        self.queues
            .terminated()
            .filter_map(move |pid| self.procs.get(&pid))
    }

    pub fn running(&self) -> Option<&Process> {
        self.cpu.and_then(|pid| self.procs.get(&pid))
    }

    pub fn cpu_is_idle(&self) -> bool {
        self.cpu.is_none()
    }

    pub fn all_terminated(&self) -> bool {
        self.queues.len(QueueKind::Terminated) == self.procs.len()
    }

    pub fn advance_time(&mut self, delta: Ticks) -> Result<Ticks, EngineError> {
        self.now = self
            .now
            .checked_add(delta)
            .ok_or(EngineError::ClockOverflow {
                now: self.now,
                delta,
            })?;
        Ok(self.now)
    }

    /// Jump an idle CPU forward to `until`, accounting the gap as idle time.
    pub fn idle_until(&mut self, until: Ticks) {
        if until > self.now {
            self.idle_time += until - self.now;
            self.now = until;
        }
    }

    /// Move every arrived Job entry to Ready (New -> Ready).
    pub fn admit_arrivals(&mut self) -> Result<Vec<Pid>, EngineError> {
        let arrived = self.queues.admit(self.now);
        for &pid in &arrived {
            self.queues.push_back(QueueKind::Ready, pid)?;
            self.process_mut(pid)?.state = ProcessState::Ready;
        }
        Ok(arrived)
    }

    /// Dispatch `pid` from Ready onto the idle CPU. Returns the previous state.
    pub fn set_running(&mut self, pid: Pid) -> Result<ProcessState, EngineError> {
        if let Some(running) = self.cpu {
            return Err(EngineError::CpuBusy {
                running,
                requested: pid,
            });
        }
        if !self.procs.contains_key(&pid) {
            return Err(EngineError::UnknownProcess(pid));
        }
        self.queues.remove(QueueKind::Ready, pid)?;

        let now = self.now;
        let proc = self.process_mut(pid)?;
        debug_assert!(
            proc.arrival_time <= now,
            "pid:{pid} dispatched before its arrival"
        );
        let prev_state = proc.state;
        proc.state = ProcessState::Running;
        if proc.start_time.is_none() {
            proc.start_time = Some(now);
            proc.response_time = Some(now - proc.arrival_time);
        }

        self.cpu = Some(pid);
        Ok(prev_state)
    }

    /// Run the current process for up to `delta` ticks. Returns its
    /// remaining service time.
    pub fn run_for(&mut self, delta: Ticks) -> Result<Ticks, EngineError> {
        let pid = self.cpu.ok_or(EngineError::NothingRunning)?;
        let delta = delta.min(self.process_mut(pid)?.remaining_time);
        // Clock first so an overflow leaves the process untouched
        self.advance_time(delta)?;

        let proc = self.process_mut(pid)?;
        proc.remaining_time -= delta;
        Ok(proc.remaining_time)
    }

    /// Retire the running process (Running -> Terminated) and free the CPU.
    pub fn complete_running(&mut self) -> Result<Pid, EngineError> {
        let pid = self.cpu.ok_or(EngineError::NothingRunning)?;
        let remaining = self.process_mut(pid)?.remaining_time;
        if remaining != 0 {
            return Err(EngineError::Unfinished { pid, remaining });
        }
        self.queues.push_back(QueueKind::Terminated, pid)?;

        let now = self.now;
        let proc = self.process_mut(pid)?;
        let turnaround = now - proc.arrival_time;
        proc.state = ProcessState::Terminated;
        proc.finish_time = Some(now);
        proc.turnaround_time = Some(turnaround);
        proc.waiting_time = Some(turnaround - proc.burst_time);

        self.cpu = None;
        Ok(pid)
    }

    pub fn clear(&mut self) {
        self.now = 0;
        self.cpu = None;
        self.procs.clear();
        self.queues.clear();
        self.idle_time = 0;
    }
}
