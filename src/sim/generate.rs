use rand::prelude::*;

use super::job::Job;
use crate::core::{Pid, Ticks};

/// Each tick a job arrives with probability `p_arrival`; it is short with
/// probability `p_short`, long otherwise.
pub fn bernoulli_jobs(
    ticks: Ticks,
    p_arrival: f64,
    p_short: f64,
    short_ticks: Ticks,
    long_ticks: Ticks,
    seed: u64,
) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst_time = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };

            jobs.push(Job::new(jobs.len() as Pid, t, burst_time));
        }
    }

    jobs
}

/// `count` jobs all arriving at t=0 with bursts drawn from `min..=max`.
pub fn batch_jobs(count: usize, min_burst: Ticks, max_burst: Ticks, seed: u64) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    let low = min_burst.max(1);
    let high = max_burst.max(low);
    (0..count)
        .map(|pid| Job::new(pid as Pid, 0, rng.random_range(low..=high)))
        .collect()
}
