use std::{env, fs, process};

use sched_sim::{
    AdvanceMode, EngineConfig, Job, Policy, PolicyKind, Process, Sim, Snapshot,
    core::{Pid, Ticks},
    scheduler::{Fcfs, Sjf},
    sim::{LoaderConfig, Report, compare, generate, loader, run_policy},
};

fn scenario() -> Snapshot {
    Snapshot::from_jobs(vec![Job::new(0, 0, 5), Job::new(1, 0, 3), Job::new(2, 0, 1)])
}

fn simulate<P: Policy>(snapshot: &Snapshot) -> Sim<P> {
    let mut sim = Sim::<P>::new(snapshot, EngineConfig::default()).unwrap();
    sim.run().unwrap();
    sim
}

fn by_pid<P: Policy>(sim: &Sim<P>, field: impl Fn(&Process) -> Option<Ticks>) -> Vec<Ticks> {
    let mut procs: Vec<_> = sim.core.ctx.procs.values().collect();
    procs.sort_by_key(|proc| proc.pid);
    procs.into_iter().map(|proc| field(proc).unwrap()).collect()
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.unwrap();
    assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
}

#[test]
fn fcfs_three_process_scenario() {
    let sim = simulate::<Fcfs>(&scenario());

    assert_eq!(by_pid(&sim, |p| p.finish_time), vec![5, 8, 9]);
    assert_eq!(by_pid(&sim, |p| p.waiting_time), vec![0, 5, 8]);
    assert_close(sim.stats().avg_waiting_time, 13.0 / 3.0);
}

#[test]
fn sjf_three_process_scenario() {
    let sim = simulate::<Sjf>(&scenario());

    let dispatch_order: Vec<Pid> = sim.completed().map(|p| p.pid).collect();
    assert_eq!(dispatch_order, vec![2, 1, 0]);
    assert_eq!(by_pid(&sim, |p| p.finish_time), vec![9, 4, 1]);
    assert_eq!(by_pid(&sim, |p| p.waiting_time), vec![4, 1, 0]);
    assert_close(sim.stats().avg_waiting_time, 5.0 / 3.0);
}

#[test]
fn timing_identities_hold_for_every_process() {
    for seed in 0..8 {
        let snapshot = Snapshot::from_jobs(generate::bernoulli_jobs(300, 0.3, 0.3, 2, 6, seed));
        let fcfs = simulate::<Fcfs>(&snapshot);
        let sjf = simulate::<Sjf>(&snapshot);

        for proc in fcfs.core.ctx.procs.values().chain(sjf.core.ctx.procs.values()) {
            let finish = proc.finish_time.unwrap();
            let turnaround = proc.turnaround_time.unwrap();
            let waiting = proc.waiting_time.unwrap();
            assert_eq!(turnaround, waiting + proc.burst_time);
            assert_eq!(turnaround, finish - proc.arrival_time);
            assert_eq!(proc.response_time, Some(waiting));
            assert_eq!(proc.remaining_time, 0);
        }
    }
}

#[test]
fn fcfs_completes_simultaneous_arrivals_in_pid_order() {
    let jobs: Vec<Job> = (0..20).map(|pid| Job::new(pid, 3, 20 - pid)).collect();
    let sim = simulate::<Fcfs>(&Snapshot::from_jobs(jobs));

    let order: Vec<Pid> = sim.completed().map(|p| p.pid).collect();
    assert_eq!(order, (0..20).collect::<Vec<_>>());
}

#[test]
fn sjf_waits_no_longer_than_fcfs() {
    for seed in 0..16 {
        let snapshot = Snapshot::from_jobs(generate::batch_jobs(50, 1, 20, seed));
        let evals = compare(&snapshot, &PolicyKind::ALL, EngineConfig::default()).unwrap();

        let fcfs = evals[0].stats.avg_waiting_time.unwrap();
        let sjf = evals[1].stats.avg_waiting_time.unwrap();
        assert!(sjf <= fcfs + 1e-9, "seed {seed}: sjf {sjf} > fcfs {fcfs}");
    }
}

#[test]
fn rerun_from_snapshot_is_identical() {
    let snapshot = Snapshot::from_jobs(generate::bernoulli_jobs(400, 0.4, 0.5, 1, 9, 11));
    for policy in PolicyKind::ALL {
        let first = run_policy(policy, &snapshot, EngineConfig::default()).unwrap();
        let second = run_policy(policy, &snapshot, EngineConfig::default()).unwrap();

        assert_eq!(first, second);
        assert_eq!(Report::new(&first).to_string(), Report::new(&second).to_string());
    }
}

#[test]
fn unit_tick_and_batch_agree_on_statistics() {
    let snapshot = Snapshot::from_jobs(generate::bernoulli_jobs(120, 0.5, 0.5, 1, 4, 3));
    let ticked = EngineConfig {
        advance: AdvanceMode::UnitTick,
    };
    for policy in PolicyKind::ALL {
        let batch = run_policy(policy, &snapshot, EngineConfig::default()).unwrap();
        assert_eq!(batch, run_policy(policy, &snapshot, ticked).unwrap());
    }
}

#[test]
fn empty_workload_reports_undefined_statistics() {
    let snapshot = Snapshot::from_jobs(Vec::new());
    for policy in PolicyKind::ALL {
        let eval = run_policy(policy, &snapshot, EngineConfig::default()).unwrap();
        assert!(eval.stats.is_degenerate());
        assert_eq!(eval.stats.throughput, None);
        assert_eq!(eval.stats.cpu_utilization, None);
        assert_eq!(eval.stats.avg_waiting_time, None);
        assert_eq!(eval.stats.avg_turnaround_time, None);
        assert_eq!(eval.stats.avg_response_time, None);
    }
}

#[test]
fn utilization_accounts_for_idle_time() {
    let snapshot = Snapshot::from_jobs(vec![Job::new(0, 2, 3), Job::new(1, 10, 5)]);
    let sim = simulate::<Fcfs>(&snapshot);
    let stats = sim.stats();

    assert_eq!(stats.elapsed_time, 15);
    assert_eq!(stats.idle_time, 7);
    assert_eq!(sim.core.ctx.idle_time, stats.idle_time);
    assert_close(stats.cpu_utilization, 8.0 / 15.0 * 100.0);
    assert_close(stats.throughput, 2.0 / 15.0);
}

#[test]
fn trace_file_to_report() {
    let path = env::temp_dir().join(format!("sched_sim_trace_{}.txt", process::id()));
    fs::write(&path, "arrival burst\n0 5\n0 3\nnot a record\n0 1\n").unwrap();

    let jobs = loader::load_path(&path, &LoaderConfig::default()).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(jobs.len(), 3);

    let snapshot = Snapshot::from_jobs(jobs);
    let eval = run_policy(PolicyKind::Sjf, &snapshot, EngineConfig::default()).unwrap();
    let report = Report::new(&eval).to_string();
    assert!(report.contains("Average waiting time: 1.67"));
}

#[test]
fn undecodable_and_out_of_range_records_are_skipped() {
    let path = env::temp_dir().join(format!("sched_sim_bad_records_{}.txt", process::id()));
    let mut trace = b"arrival burst\n0 5\n\xff\xfe 3\n".to_vec();
    trace.extend_from_slice(b"18446744073709551615 5\n1 1\n");
    fs::write(&path, trace).unwrap();

    let jobs = loader::load_path(&path, &LoaderConfig::default()).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(jobs, vec![Job::new(0, 0, 5), Job::new(1, 1, 1)]);

    let eval = run_policy(PolicyKind::Fcfs, &Snapshot::from_jobs(jobs), EngineConfig::default())
        .unwrap();
    assert_eq!(eval.stats.completed, 2);
    assert_eq!(eval.stats.elapsed_time, 6);
}
