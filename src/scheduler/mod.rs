pub mod fcfs;
pub mod sjf;

use std::{error::Error, fmt, str::FromStr};

use log::{debug, warn};

use crate::core::{EngineState, Pid};
pub use fcfs::Fcfs;
pub use sjf::Sjf;

/// What a policy wants done with the CPU this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    KeepRunning,
    Dispatch(Pid),
    Idle,
}

/// A dispatch policy. Policies only read the engine state; the loop
/// performs the transition they ask for.
pub trait Policy {
    fn init(ctx: &EngineState) -> Self
    where
        Self: Sized;

    fn name(&self) -> &'static str;

    fn select(&self, ctx: &EngineState) -> Decision;
}

/// The closed set of built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Fcfs,
    Sjf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown scheduling policy selector {:?}", self.0)
    }
}

impl Error for UnknownPolicy {}

impl PolicyKind {
    pub const ALL: [PolicyKind; 2] = [PolicyKind::Fcfs, PolicyKind::Sjf];

    pub fn selector(self) -> u8 {
        match self {
            PolicyKind::Fcfs => 0,
            PolicyKind::Sjf => 1,
        }
    }

    /// Resolve a user-supplied selector, falling back to FCFS when it is
    /// absent or invalid.
    pub fn from_selector(input: Option<&str>) -> Self {
        match input.map(str::trim).filter(|s| !s.is_empty()) {
            None => {
                debug!("no policy selected, using {}", PolicyKind::Fcfs);
                PolicyKind::Fcfs
            }
            Some(input) => input.parse().unwrap_or_else(|err: UnknownPolicy| {
                warn!("{err}, defaulting to {}", PolicyKind::Fcfs);
                PolicyKind::Fcfs
            }),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "fcfs" | "fifo" => Ok(PolicyKind::Fcfs),
            "1" | "sjf" => Ok(PolicyKind::Sjf),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PolicyKind::Fcfs => write!(f, "FCFS"),
            PolicyKind::Sjf => write!(f, "SJF"),
        }
    }
}
