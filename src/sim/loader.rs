//! Workload trace loading.
//!
//! The trace is a header line followed by one `arrival burst` record per
//! line. Records that do not parse are skipped; only an unreadable or
//! completely empty source fails the load.

use std::{
    error::Error,
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    str,
};

use log::{debug, warn};

use super::job::Job;
use crate::core::{Pid, Ticks};

pub const DEFAULT_MAX_PROCESSES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    pub max_processes: usize,
    pub has_header: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_processes: DEFAULT_MAX_PROCESSES,
            has_header: true,
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Empty,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::Io(err) => write!(f, "cannot read workload: {err}"),
            LoadError::Empty => write!(f, "workload source is empty"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io(err) => Some(err),
            LoadError::Empty => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Io(err)
    }
}

pub fn load_path(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<Vec<Job>, LoadError> {
    let file = File::open(path)?;
    parse(BufReader::new(file), config)
}

/// Parse a trace. Pids are assigned in load order starting at 0.
pub fn parse(reader: impl BufRead, config: &LoaderConfig) -> Result<Vec<Job>, LoadError> {
    let mut lines = reader.split(b'\n');
    let mut saw_line = false;

    if config.has_header {
        // Header content is never interpreted, so its encoding does not matter
        match lines.next() {
            Some(header) => {
                header?;
                saw_line = true;
            }
            None => return Err(LoadError::Empty),
        }
    }

    let mut jobs = Vec::new();
    for (idx, raw) in lines.enumerate() {
        let raw = raw?;
        saw_line = true;
        if jobs.len() >= config.max_processes {
            debug!("workload capped at {} processes", config.max_processes);
            break;
        }

        let lineno = idx + 1 + usize::from(config.has_header);
        let Ok(line) = str::from_utf8(&raw) else {
            warn!(
                "skipping malformed record on line {lineno}: {:?}",
                String::from_utf8_lossy(&raw)
            );
            continue;
        };
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        match parse_record(line) {
            Some((arrival_time, burst_time)) => {
                jobs.push(Job::new(jobs.len() as Pid, arrival_time, burst_time));
            }
            None => warn!("skipping malformed record on line {lineno}: {line:?}"),
        }
    }

    if !saw_line {
        return Err(LoadError::Empty);
    }
    debug!("loaded {} processes", jobs.len());
    Ok(jobs)
}

// A record whose completion time would not fit in `Ticks` is malformed
fn parse_record(line: &str) -> Option<(Ticks, Ticks)> {
    let mut fields = line.split_whitespace();
    let arrival = parse_ticks(fields.next()?)?;
    let burst = parse_ticks(fields.next()?)?;
    arrival.checked_add(burst)?;
    (burst > 0).then_some((arrival, burst))
}

// Accepts `7` and `7.0`; anything fractional, negative or non-finite is rejected
fn parse_ticks(field: &str) -> Option<Ticks> {
    if let Ok(ticks) = field.parse::<Ticks>() {
        return Some(ticks);
    }
    let value: f64 = field.parse().ok()?;
    let integral = value.is_finite() && value >= 0.0 && value.fract() == 0.0;
    // `Ticks::MAX as f64` rounds up to 2^64, which is itself out of range
    (integral && value < Ticks::MAX as f64).then_some(value as Ticks)
}
