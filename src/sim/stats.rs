use average::{Estimate, Mean};

use crate::core::{EngineState, Process, Ticks};

/// Summary of a finished trial. Ratios are `None` when the run is
/// degenerate (no processes or zero elapsed time).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub processes: usize,
    pub completed: usize,
    pub elapsed_time: Ticks,
    pub total_burst: Ticks,
    pub idle_time: Ticks,
    /// Completed processes per tick.
    pub throughput: Option<f64>,
    /// Busy share of the elapsed time, in percent.
    pub cpu_utilization: Option<f64>,
    pub avg_waiting_time: Option<f64>,
    pub avg_turnaround_time: Option<f64>,
    pub avg_response_time: Option<f64>,
}

impl Stats {
    pub fn collect(ctx: &EngineState) -> Self {
        Self::from_terminated(ctx.terminated(), ctx.loaded())
    }

    /// Aggregate over terminated processes; averages divide by `processes`,
    /// the size of the loaded workload.
    pub fn from_terminated<'a>(
        terminated: impl IntoIterator<Item = &'a Process>,
        processes: usize,
    ) -> Self {
        let terminated: Vec<&Process> = terminated.into_iter().collect();
        let completed = terminated.len();
        let elapsed_time = terminated
            .iter()
            .filter_map(|proc| proc.finish_time)
            .max()
            .unwrap_or(0);
        // Busy time never exceeds the finish clock, so this only saturates
        // on hand-built input
        let total_burst = terminated
            .iter()
            .fold(0, |total: Ticks, proc| total.saturating_add(proc.burst_time));

        let mut stats = Self {
            processes,
            completed,
            elapsed_time,
            total_burst,
            idle_time: elapsed_time.saturating_sub(total_burst),
            throughput: None,
            cpu_utilization: None,
            avg_waiting_time: None,
            avg_turnaround_time: None,
            avg_response_time: None,
        };
        if stats.is_degenerate() {
            return stats;
        }

        let elapsed = elapsed_time as f64;
        let scale = completed as f64 / processes as f64;
        let avg = |metric: fn(&Process) -> Option<Ticks>| {
            let mean: Mean = terminated
                .iter()
                .map(|proc| metric(proc).unwrap_or(0) as f64)
                .collect();
            mean.estimate() * scale
        };

        stats.throughput = Some(completed as f64 / elapsed);
        stats.cpu_utilization = Some(total_burst as f64 / elapsed * 100.0);
        stats.avg_waiting_time = Some(avg(|proc| proc.waiting_time));
        stats.avg_turnaround_time = Some(avg(|proc| proc.turnaround_time));
        stats.avg_response_time = Some(avg(|proc| proc.response_time));
        stats
    }

    pub fn is_degenerate(&self) -> bool {
        self.processes == 0 || self.elapsed_time == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pid;

    fn finished(pid: Pid, arrival: Ticks, burst: Ticks, start: Ticks) -> Process {
        let mut proc = Process::new(pid, arrival, burst);
        let finish = start + burst;
        proc.remaining_time = 0;
        proc.start_time = Some(start);
        proc.response_time = Some(start - arrival);
        proc.finish_time = Some(finish);
        proc.turnaround_time = Some(finish - arrival);
        proc.waiting_time = Some(finish - arrival - burst);
        proc
    }

    #[test]
    fn aggregates_terminated_processes() {
        let procs = [finished(0, 0, 5, 0), finished(1, 0, 3, 5), finished(2, 0, 1, 8)];
        let stats = Stats::from_terminated(&procs, 3);

        assert_eq!(stats.elapsed_time, 9);
        assert_eq!(stats.total_burst, 9);
        assert_eq!(stats.idle_time, 0);
        assert!((stats.throughput.unwrap() - 3.0 / 9.0).abs() < 1e-9);
        assert!((stats.cpu_utilization.unwrap() - 100.0).abs() < 1e-9);
        assert!((stats.avg_waiting_time.unwrap() - 13.0 / 3.0).abs() < 1e-9);
        assert!((stats.avg_turnaround_time.unwrap() - 22.0 / 3.0).abs() < 1e-9);
        assert!((stats.avg_response_time.unwrap() - 13.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn idle_gaps_lower_utilization() {
        let procs = [finished(0, 0, 2, 0), finished(1, 6, 2, 6)];
        let stats = Stats::from_terminated(&procs, 2);

        assert_eq!(stats.elapsed_time, 8);
        assert_eq!(stats.idle_time, 4);
        assert!((stats.cpu_utilization.unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn total_burst_does_not_wrap() {
        let mut huge = finished(1, 0, 1, 0);
        huge.burst_time = Ticks::MAX;
        let procs = [finished(0, 0, 2, 0), huge];
        let stats = Stats::from_terminated(&procs, 2);

        assert_eq!(stats.total_burst, Ticks::MAX);
        assert_eq!(stats.idle_time, 0);
    }

    #[test]
    fn empty_workload_is_undefined() {
        let none: [Process; 0] = [];
        let stats = Stats::from_terminated(&none, 0);

        assert!(stats.is_degenerate());
        assert_eq!(stats.elapsed_time, 0);
        assert_eq!(stats.throughput, None);
        assert_eq!(stats.cpu_utilization, None);
        assert_eq!(stats.avg_waiting_time, None);
        assert_eq!(stats.avg_turnaround_time, None);
        assert_eq!(stats.avg_response_time, None);
    }

    #[test]
    fn nothing_finished_is_undefined() {
        let none: [Process; 0] = [];
        let stats = Stats::from_terminated(&none, 4);
        assert!(stats.is_degenerate());
        assert_eq!(stats.avg_waiting_time, None);
    }
}
