use std::{cmp::Ordering, collections::VecDeque, error::Error, fmt};

use keyed_priority_queue::KeyedPriorityQueue;
use log::warn;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use super::state::{Pid, Ticks};

new_key_type! {
    pub struct QueueId;
}

/// The four life-cycle collections a process moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    Job,
    Ready,
    Waiting,
    Terminated,
}

impl QueueKind {
    pub const ALL: [QueueKind; 4] = [
        QueueKind::Job,
        QueueKind::Ready,
        QueueKind::Waiting,
        QueueKind::Terminated,
    ];
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueueKind::Job => write!(f, "job queue"),
            QueueKind::Ready => write!(f, "ready queue"),
            QueueKind::Waiting => write!(f, "waiting queue"),
            QueueKind::Terminated => write!(f, "terminated set"),
        }
    }
}

/// Ordering key of the Job collection: earliest arrival first, ties by pid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalKey {
    pub arrival: Ticks,
    pub pid: Pid,
}

// KeyedPriorityQueue is a max-heap, so we need to flip-flop ArrivalKey's Ord
impl Ord for ArrivalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.arrival, other.pid).cmp(&(self.arrival, self.pid))
    }
}

impl PartialOrd for ArrivalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
pub enum QueueError {
    Duplicate { pid: Pid, held_by: QueueKind },
    Missing { pid: Pid, queue: QueueKind },
    ArrivalRequired { pid: Pid },
    AppendOnly { pid: Pid },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueueError::Duplicate { pid, held_by } => {
                write!(f, "process pid:{pid} is already in the {held_by}")
            }
            QueueError::Missing { pid, queue } => {
                write!(f, "cannot find pid:{pid} in the {queue}")
            }
            QueueError::ArrivalRequired { pid } => {
                write!(f, "pid:{pid} must be pushed to the job queue with its arrival time")
            }
            QueueError::AppendOnly { pid } => {
                write!(f, "pid:{pid} cannot be removed from the terminated set")
            }
        }
    }
}

impl Error for QueueError {}

#[derive(Debug)]
enum Queue {
    Arrival {
        procs: KeyedPriorityQueue<Pid, ArrivalKey>,
    },
    Fifo {
        procs: VecDeque<Pid>,
    },
}

impl Queue {
    fn new_arrival() -> Self {
        Self::Arrival {
            procs: KeyedPriorityQueue::new(),
        }
    }

    fn new_fifo() -> Self {
        Self::Fifo {
            procs: VecDeque::new(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Arrival { procs } => procs.len(),
            Self::Fifo { procs } => procs.len(),
        }
    }

    fn contains(&self, pid: Pid) -> bool {
        match self {
            Self::Arrival { procs } => procs.get_priority(&pid).is_some(),
            Self::Fifo { procs } => procs.contains(&pid),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Arrival { procs } => *procs = KeyedPriorityQueue::new(),
            Self::Fifo { procs } => procs.clear(),
        }
    }
}

/// Job, Ready, Waiting and Terminated collections holding process ids.
///
/// A pid is a member of at most one collection at a time. Every rejected
/// insert or removal leaves all four collections untouched.
#[derive(Debug)]
pub struct QueueSet {
    queues: SlotMap<QueueId, Queue>,
    job_id: QueueId,
    ready_id: QueueId,
    waiting_id: QueueId,
    terminated_id: QueueId,
    membership: FxHashMap<Pid, QueueKind>,
}

impl QueueSet {
    pub fn new() -> Self {
        let mut queues = SlotMap::with_capacity_and_key(QueueKind::ALL.len());
        let job_id = queues.insert(Queue::new_arrival());
        let ready_id = queues.insert(Queue::new_fifo());
        let waiting_id = queues.insert(Queue::new_fifo());
        let terminated_id = queues.insert(Queue::new_fifo());

        Self {
            queues,
            job_id,
            ready_id,
            waiting_id,
            terminated_id,
            membership: FxHashMap::default(),
        }
    }

    fn id(&self, kind: QueueKind) -> QueueId {
        match kind {
            QueueKind::Job => self.job_id,
            QueueKind::Ready => self.ready_id,
            QueueKind::Waiting => self.waiting_id,
            QueueKind::Terminated => self.terminated_id,
        }
    }

    fn check_absent(&self, pid: Pid) -> Result<(), QueueError> {
        match self.membership.get(&pid) {
            Some(&held_by) => {
                let err = QueueError::Duplicate { pid, held_by };
                warn!("{err}");
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Seed a not-yet-arrived process into the Job collection.
    pub fn push_job(&mut self, pid: Pid, arrival: Ticks) -> Result<(), QueueError> {
        self.check_absent(pid)?;
        let id = self.job_id;
        let Queue::Arrival { procs } = &mut self.queues[id] else {
            unreachable!("job slot always holds the arrival queue");
        };
        procs.push(pid, ArrivalKey { arrival, pid });
        self.membership.insert(pid, QueueKind::Job);
        Ok(())
    }

    /// Append to Ready, Waiting or Terminated.
    pub fn push_back(&mut self, kind: QueueKind, pid: Pid) -> Result<(), QueueError> {
        if kind == QueueKind::Job {
            let err = QueueError::ArrivalRequired { pid };
            warn!("{err}");
            return Err(err);
        }
        self.check_absent(pid)?;
        let id = self.id(kind);
        let Queue::Fifo { procs } = &mut self.queues[id] else {
            unreachable!("{kind} is always a fifo");
        };
        procs.push_back(pid);
        self.membership.insert(pid, kind);
        Ok(())
    }

    /// Remove `pid` from `kind`. The Terminated set never gives entries back.
    pub fn remove(&mut self, kind: QueueKind, pid: Pid) -> Result<Pid, QueueError> {
        if kind == QueueKind::Terminated {
            let err = QueueError::AppendOnly { pid };
            warn!("{err}");
            return Err(err);
        }
        if self.membership.get(&pid) != Some(&kind) {
            let err = QueueError::Missing { pid, queue: kind };
            warn!("{err}");
            return Err(err);
        }

        let id = self.id(kind);
        let removed = match &mut self.queues[id] {
            Queue::Arrival { procs } => procs.remove(&pid).map(|_| pid),
            Queue::Fifo { procs } => procs
                .iter()
                .position(|&p| p == pid)
                .and_then(|idx| procs.remove(idx)),
        };
        debug_assert_eq!(removed, Some(pid), "membership out of sync for pid:{pid}");

        self.membership.remove(&pid);
        Ok(pid)
    }

    /// Earliest not-yet-arrived process and its arrival time.
    pub fn peek_earliest(&self) -> Option<(Pid, Ticks)> {
        match &self.queues[self.job_id] {
            Queue::Arrival { procs } => procs.peek().map(|(&pid, key)| (pid, key.arrival)),
            Queue::Fifo { .. } => None,
        }
    }

    /// Remove and return, in arrival order, every Job entry with
    /// `arrival <= now`.
    pub fn admit(&mut self, now: Ticks) -> Vec<Pid> {
        let mut arrived = Vec::new();
        let id = self.job_id;
        if let Queue::Arrival { procs } = &mut self.queues[id] {
            while procs.peek().is_some_and(|(_, key)| key.arrival <= now) {
                if let Some((pid, _)) = procs.pop() {
                    arrived.push(pid);
                }
            }
        }
        for pid in &arrived {
            self.membership.remove(pid);
        }
        arrived
    }

    fn fifo(&self, kind: QueueKind) -> impl Iterator<Item = Pid> + '_ {
        let procs = match &self.queues[self.id(kind)] {
            Queue::Fifo { procs } => Some(procs),
            Queue::Arrival { .. } => None,
        };
        procs.into_iter().flatten().copied()
    }

    /// Ready entries in insertion order.
    pub fn ready(&self) -> impl Iterator<Item = Pid> + '_ {
        self.fifo(QueueKind::Ready)
    }

    pub fn waiting(&self) -> impl Iterator<Item = Pid> + '_ {
        self.fifo(QueueKind::Waiting)
    }

    /// Terminated entries in completion order.
    pub fn terminated(&self) -> impl Iterator<Item = Pid> + '_ {
        self.fifo(QueueKind::Terminated)
    }

    /// Job entries in arrival order.
    pub fn jobs(&self) -> Vec<Pid> {
        match &self.queues[self.job_id] {
            Queue::Arrival { procs } => {
                let mut keys: Vec<ArrivalKey> = procs.iter().map(|(_, key)| *key).collect();
                // Reversed Ord: descending sort yields earliest arrival first
                keys.sort_by(|a, b| b.cmp(a));
                keys.into_iter().map(|key| key.pid).collect()
            }
            Queue::Fifo { .. } => Vec::new(),
        }
    }

    pub fn len(&self, kind: QueueKind) -> usize {
        self.queues[self.id(kind)].len()
    }

    pub fn is_empty(&self, kind: QueueKind) -> bool {
        self.len(kind) == 0
    }

    pub fn contains(&self, kind: QueueKind, pid: Pid) -> bool {
        self.queues[self.id(kind)].contains(pid)
    }

    /// Collection currently holding `pid`, if any.
    pub fn location(&self, pid: Pid) -> Option<QueueKind> {
        self.membership.get(&pid).copied()
    }

    /// Per-collection member counts, in `QueueKind::ALL` order.
    pub fn member_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for &kind in self.membership.values() {
            counts[kind as usize] += 1;
        }
        counts
    }

    pub fn members(&self) -> impl Iterator<Item = (Pid, QueueKind)> + '_ {
        self.membership.iter().map(|(&pid, &kind)| (pid, kind))
    }

    pub fn clear(&mut self) {
        for (_, queue) in self.queues.iter_mut() {
            queue.clear();
        }
        self.membership.clear();
    }
}

impl Default for QueueSet {
    fn default() -> Self {
        Self::new()
    }
}
