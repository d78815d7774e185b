use std::fs::File;
use std::process;

use clap::Parser;
use log::error;
use log::info;

use hybrid_lib::error::SimulatorError;
use hybrid_lib::error::SimulatorResult;
use hybrid_lib::flags::HybridArgs;
use hybrid_lib::run_wrapper;

fn main() {
    let args = HybridArgs::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.policy().log_level()),
    )
    .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &HybridArgs) -> SimulatorResult<()> {
    if args.program.is_none() && args.trace.is_none() {
        return Err(SimulatorError::ConfigError(
            "nothing to run: pass --program and/or --trace".into(),
        ));
    }

    let policy = args.policy();

    if let Some(program) = &args.program {
        let cpu = run_wrapper::run(program, policy)?;
        match &args.dump {
            Some(path) => run_wrapper::write_register_dump(File::create(path)?, &cpu.gpr)?,
            None => run_wrapper::write_register_dump(std::io::stdout(), &cpu.gpr)?,
        }
    }

    if let Some(trace) = &args.trace {
        let accel = run_wrapper::run_trace(trace, args.accel_config(), policy)?;
        for completion in &accel.controller.completions {
            println!(
                "core {} {:?} {:#06x} {:#06x} -> {:#06x} {:?} (cycles {}..{})",
                completion.core,
                completion.entry.opcode,
                completion.entry.operand_a,
                completion.entry.operand_b,
                completion.result,
                completion.status,
                completion.dispatch_cycle,
                completion.complete_cycle,
            );
        }
        info!("final result {:#06x} ({:?})", accel.controller.result(), accel.controller.status());
    }

    Ok(())
}
