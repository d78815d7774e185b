//! A simulator wrapper

use std::io;
use std::path::Path;

use log::info;

use crate::accel::bf16;
use crate::accel::controller::AcceleratorHistory;
use crate::accel::host::HostRequest;
use crate::accel::host::HostResponse;
use crate::accel::AccelOpcode;
use crate::accel::Accelerator;
use crate::accel::AcceleratorConfig;
use crate::cpu::CPUPolicy;
use crate::cpu::CPUState;
use crate::cpu::RegisterFile;
use crate::error::SimulatorResult;
use crate::loader;
use crate::memory::mmu::MMU;
use crate::single_cycle;

/// Run the program file through the scalar pipeline
/// and return the final CPU state
pub fn run(program_file: &Path, policy: CPUPolicy) -> SimulatorResult<CPUState> {
    let program = loader::load_program(program_file)?;

    let mut cpu = CPUState::make(policy);
    let mut mem = MMU::make();
    let cycles = single_cycle::run(&mut cpu, &program, &mut mem);

    if policy.history {
        info!("[HISTORY] # cycles = {}", cycles);
        info!("[HISTORY] {:?}", cpu.history);
    }

    Ok(cpu)
}

/// Run the host trace file through a fresh accelerator
pub fn run_trace(
    trace_file: &Path,
    config: AcceleratorConfig,
    policy: CPUPolicy,
) -> SimulatorResult<Accelerator> {
    let requests = loader::load_trace(trace_file)?;
    let mut accel = Accelerator::new(config)?;
    let responses = run_trace_requests(&mut accel, &requests)?;

    if policy.history {
        log_history(&accel.controller.history);
        let acked = responses.iter().filter(|r| r.ack).count();
        info!("[HISTORY] host acks = {}", acked);
    }

    Ok(accel)
}

/// Presents one request per cycle slot, then drains the accelerator.
/// Returns the response of every presented slot.
pub fn run_trace_requests(
    accel: &mut Accelerator,
    requests: &[HostRequest],
) -> SimulatorResult<Vec<HostResponse>> {
    let responses: Vec<HostResponse> =
        requests.iter().map(|request| accel.tick(request)).collect();
    accel.run_until_idle()?;
    Ok(responses)
}

/// Arithmetic requests cycling through `opcodes`, one every `interval`
/// cycle slots with idle slots in between
pub fn synthetic_workload(
    opcodes: &[AccelOpcode],
    count: usize,
    interval: usize,
) -> Vec<HostRequest> {
    let mut requests = Vec::with_capacity(count * interval.max(1));
    for i in 0..count {
        let Some(&opcode) = opcodes.get(i % opcodes.len().max(1)) else {
            break;
        };
        let a = bf16::from_f32((i + 1) as f32);
        let b = bf16::from_f32((i % 7 + 1) as f32);
        requests.push(HostRequest::arithmetic(opcode, a, b));
        for _ in 1..interval {
            requests.push(HostRequest::idle());
        }
    }
    requests
}

pub fn log_history(history: &AcceleratorHistory) {
    info!("[HISTORY] # cycles = {}", history.cycle_count);
    info!(
        "[HISTORY] enqueued = {}, dropped = {}, dispatched = {}",
        history.enqueued, history.dropped, history.dispatched
    );
    info!("[HISTORY] completed = {}, errors = {}", history.completed, history.errors);
}

/// Writes `register,value` rows for every slot
pub fn write_register_dump(writer: impl io::Write, gpr: &RegisterFile) -> SimulatorResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["register", "value"])?;
    for (i, value) in gpr.dump().iter().enumerate() {
        writer.write_record([format!("r{}", i), format!("{:#018x}", value)])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::bf16::from_f32;
    use crate::accel::Status;
    use crate::types::DataType;

    #[test]
    fn test_trace_requests_end_to_end() {
        let mut accel = Accelerator::new(AcceleratorConfig::default()).unwrap();
        let requests = [
            HostRequest::arithmetic(AccelOpcode::Add, from_f32(5.0), from_f32(3.0)),
            HostRequest::idle(),
            HostRequest::arithmetic(AccelOpcode::Div, from_f32(15.0), from_f32(3.0)),
            HostRequest::idle(),
            HostRequest::local_ram_write(3, 0x1234),
        ];
        let responses = run_trace_requests(&mut accel, &requests).unwrap();
        assert!(responses[1].ack);
        assert!(accel.controller.is_drained());

        let results: Vec<(u16, Status)> =
            accel.controller.completions.iter().map(|c| (c.result, c.status)).collect();
        let expected = vec![(from_f32(8.0), Status::Success), (from_f32(5.0), Status::Success)];
        assert_eq!(results, expected);
        assert_eq!(accel.ram.peek(3), 0x1234);
        assert_eq!(accel.controller.history.dropped, 0);
    }

    #[test]
    fn test_synthetic_workload() {
        let requests = synthetic_workload(&[AccelOpcode::Add, AccelOpcode::Mul], 3, 2);
        assert_eq!(requests.len(), 6);
        assert_eq!(requests[2].accel_opcode(), AccelOpcode::Mul);
        assert_eq!(requests[3], HostRequest::idle());
        assert_eq!(requests[4].operand_a, from_f32(3.0));
        assert!(synthetic_workload(&[], 4, 1).is_empty());
    }

    #[test]
    fn test_register_dump() {
        let mut gpr = RegisterFile::new();
        gpr.write(1, 0xff, DataType::INT8);
        gpr.write(2, 42, DataType::INT64);
        let mut out = Vec::new();
        write_register_dump(&mut out, &gpr).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 17);
        assert_eq!(lines[0], "register,value");
        assert_eq!(lines[1], "r0,0x0000000000000000");
        assert_eq!(lines[2], "r1,0xffffffffffffffff");
        assert_eq!(lines[3], "r2,0x000000000000002a");
    }
}
