use std::process;

use hybrid_lib::accel::controller::Completion;
use hybrid_lib::accel::AccelOpcode;
use hybrid_lib::accel::Accelerator;
use hybrid_lib::accel::AcceleratorConfig;
use hybrid_lib::error::SimulatorResult;
use hybrid_lib::run_wrapper::run_trace_requests;
use hybrid_lib::run_wrapper::synthetic_workload;

const REQUEST_COUNT: usize = 12;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run_eval() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn mean_latency(completions: &[Completion]) -> f64 {
    if completions.is_empty() {
        return 0.0;
    }
    let total: u64 = completions.iter().map(|c| c.complete_cycle - c.dispatch_cycle).sum();
    total as f64 / completions.len() as f64
}

fn run_eval() -> SimulatorResult<()> {
    use AccelOpcode::*;

    std::fs::create_dir_all("eval")?;
    let output_path = "eval/mix_eval.csv";
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record([
        "Mix",
        "Cores",
        "Completed",
        "Dropped",
        "Errors",
        "Cycles",
        "Mean latency",
        "Requests per cycle",
    ])?;

    let mixes: Vec<(&str, Vec<AccelOpcode>)> = vec![
        ("add", vec![Add]),
        ("sub", vec![Sub]),
        ("mul", vec![Mul]),
        ("div", vec![Div]),
        ("balanced", vec![Add, Sub, Mul, Div]),
        ("div-heavy", vec![Div, Div, Div, Add]),
    ];

    for (name, mix) in mixes.iter() {
        for cores in [1, 2, 4] {
            let mut accel = Accelerator::new(AcceleratorConfig {
                core_count: cores,
                ..Default::default()
            })?;
            let requests = synthetic_workload(mix, REQUEST_COUNT, 1);
            run_trace_requests(&mut accel, &requests)?;

            let history = accel.controller.history;
            let completions = &accel.controller.completions;
            let throughput = history.completed as f64 / history.cycle_count.max(1) as f64;
            eprintln!("Mix {} on {} cores: {} cycles", name, cores, history.cycle_count);

            writer.write_record([
                name.to_string(),
                cores.to_string(),
                history.completed.to_string(),
                history.dropped.to_string(),
                history.errors.to_string(),
                history.cycle_count.to_string(),
                format!("{:.3}", mean_latency(completions)),
                format!("{:.3}", throughput),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}
