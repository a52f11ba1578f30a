use std::fmt;

use super::{driver::Evaluation, stats::Stats};

const UNDEFINED: &str = "undefined";

struct Value(Option<f64>);

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(value) => f.pad(&format!("{value:.2}")),
            None => f.pad(UNDEFINED),
        }
    }
}

fn elapsed(stats: &Stats) -> Value {
    Value((!stats.is_degenerate()).then_some(stats.elapsed_time as f64))
}

/// Labeled two-decimal summary of one trial.
pub struct Report<'a> {
    evaluation: &'a Evaluation,
}

impl<'a> Report<'a> {
    pub fn new(evaluation: &'a Evaluation) -> Self {
        Self { evaluation }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let stats = &self.evaluation.stats;
        writeln!(f, "Scheduling policy: {}", self.evaluation.policy)?;
        writeln!(f, "Processes completed: {}/{}", stats.completed, stats.processes)?;
        writeln!(f, "Total elapsed time: {}", elapsed(stats))?;
        writeln!(f, "Throughput: {} processes/tick", Value(stats.throughput))?;
        writeln!(f, "CPU utilization: {}%", Value(stats.cpu_utilization))?;
        writeln!(f, "Average waiting time: {}", Value(stats.avg_waiting_time))?;
        writeln!(f, "Average turnaround time: {}", Value(stats.avg_turnaround_time))?;
        write!(f, "Average response time: {}", Value(stats.avg_response_time))
    }
}

/// Side-by-side view of several policies run on the same workload.
pub struct ComparisonTable<'a>(pub &'a [Evaluation]);

impl fmt::Display for ComparisonTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:<8} {:>10} {:>10} {:>8} {:>10} {:>10} {:>10}",
            "policy", "elapsed", "thruput", "cpu%", "waiting", "turnaround", "response"
        )?;
        for (idx, eval) in self.0.iter().enumerate() {
            let stats = &eval.stats;
            if idx > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{:<8} {:>10} {:>10} {:>8} {:>10} {:>10} {:>10}",
                eval.policy.to_string(),
                elapsed(stats),
                Value(stats.throughput),
                Value(stats.cpu_utilization),
                Value(stats.avg_waiting_time),
                Value(stats.avg_turnaround_time),
                Value(stats.avg_response_time),
            )?;
        }
        Ok(())
    }
}
