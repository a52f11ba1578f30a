use std::{
    env,
    io::{self, Write},
    process::ExitCode,
};

use anyhow::{Context, Result, bail};
use sched_sim::{
    EngineConfig, PolicyKind, Snapshot,
    sim::{ComparisonTable, LoaderConfig, Report, compare, loader, run_policy},
};

const MAX_PROCESSES_VAR: &str = "SCHED_SIM_MAX_PROCESSES";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut compare_all = false;
    let mut positional = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--compare" => compare_all = true,
            _ => positional.push(arg),
        }
    }
    let Some(path) = positional.first() else {
        bail!("usage: sched_sim [--compare] <workload-file> [0=FCFS|1=SJF]");
    };

    let config = loader_config()?;
    let jobs = loader::load_path(path, &config)
        .with_context(|| format!("failed to load workload from {path}"))?;
    let snapshot = Snapshot::from_jobs(jobs);

    if compare_all {
        let evals = compare(&snapshot, &PolicyKind::ALL, EngineConfig::default())?;
        println!("{}", ComparisonTable(&evals));
        return Ok(());
    }

    let selector = match positional.get(1) {
        Some(selector) => Some(selector.clone()),
        None => prompt_selector()?,
    };
    let policy = PolicyKind::from_selector(selector.as_deref());
    let eval = run_policy(policy, &snapshot, EngineConfig::default())?;
    println!("{}", Report::new(&eval));
    Ok(())
}

fn loader_config() -> Result<LoaderConfig> {
    let mut config = LoaderConfig::default();
    if let Ok(value) = env::var(MAX_PROCESSES_VAR) {
        config.max_processes = value.trim().parse().with_context(|| {
            format!("{MAX_PROCESSES_VAR} must be a process count, got {value:?}")
        })?;
    }
    Ok(config)
}

fn prompt_selector() -> Result<Option<String>> {
    println!("Select scheduling algorithm (default FCFS):");
    for policy in PolicyKind::ALL {
        println!("{} - {}", policy.selector(), policy);
    }
    print!("Enter your choice (press Enter for FCFS): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    Ok((!input.is_empty()).then(|| input.to_string()))
}
