//! Utility functions for reading programs and host traces

use std::path::Path;

use csv::ReaderBuilder;
use csv::StringRecord;
use csv::Trim;

use crate::accel::bf16;
use crate::accel::host::HostRequest;
use crate::accel::AccelOpcode;
use crate::error::LoadError;
use crate::error::SimulatorResult;

/// Host trace columns, in header order
pub const TRACE_COLUMNS: [&str; 7] = [
    "opcode",
    "write",
    "operand_a",
    "operand_b",
    "local_ram_addr",
    "external_addr",
    "external_write_data",
];

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| LoadError::FileReadError(path.into(), e))
}

/// Loads an instruction program: one 32-bit hex word per line
pub fn load_program(path: &Path) -> SimulatorResult<Vec<u32>> {
    let content = read_file(path)?;
    Ok(parse_program(path, &content)?)
}

pub fn parse_program(path: &Path, content: &str) -> Result<Vec<u32>, LoadError> {
    let mut program = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let word = line.split('#').next().unwrap_or("").trim();
        if word.is_empty() {
            continue;
        }
        let digits = word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")).unwrap_or(word);
        let raw = u32::from_str_radix(&digits.replace('_', ""), 16).map_err(|_| {
            LoadError::ParseError(
                path.into(),
                format!("Invalid instruction word '{}' at line {}", word, line_num + 1),
            )
        })?;
        program.push(raw);
    }

    if program.is_empty() {
        return Err(LoadError::EmptyProgram(path.into()));
    }
    Ok(program)
}

/// Loads a host trace: one CSV row per cycle slot
pub fn load_trace(path: &Path) -> SimulatorResult<Vec<HostRequest>> {
    let content = read_file(path)?;
    Ok(parse_trace(path, &content)?)
}

pub fn parse_trace(path: &Path, content: &str) -> Result<Vec<HostRequest>, LoadError> {
    let parse_error = |msg: String| LoadError::ParseError(path.into(), msg);

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(|e| parse_error(e.to_string()))?.clone();
    let columns: Vec<Option<usize>> = TRACE_COLUMNS
        .iter()
        .map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
        .collect();
    if columns[0].is_none() {
        return Err(parse_error("Missing 'opcode' column".into()));
    }

    let mut requests = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| parse_error(e.to_string()))?;
        // Header is line 1
        let line = record.position().map_or(row as u64 + 2, |p| p.line());
        let request = parse_trace_record(&record, &columns)
            .map_err(|msg| parse_error(format!("{} at line {}", msg, line)))?;
        requests.push(request);
    }
    Ok(requests)
}

fn parse_trace_record(
    record: &StringRecord,
    columns: &[Option<usize>],
) -> Result<HostRequest, String> {
    let cell = |i: usize| columns[i].and_then(|c| record.get(c)).unwrap_or("");

    let opcode = cell(0);
    let Some(opcode) = parse_opcode(opcode) else {
        return Ok(HostRequest::idle());
    };

    let write = match cell(1).to_ascii_lowercase().as_str() {
        "" | "0" | "r" | "false" => false,
        "1" | "w" | "true" => true,
        other => return Err(format!("Invalid write flag '{}'", other)),
    };

    Ok(HostRequest {
        valid: true,
        write,
        opcode: opcode
            .ok_or_else(|| format!("Unknown opcode '{}'", cell(0)))?,
        operand_a: parse_operand(cell(2))?,
        operand_b: parse_operand(cell(3))?,
        local_ram_addr: parse_address(cell(4))?,
        external_addr: parse_address(cell(5))?,
        external_write_data: parse_operand(cell(6))?,
    })
}

/// `None` for an idle slot, `Some(None)` for an unrecognized opcode
fn parse_opcode(cell: &str) -> Option<Option<u8>> {
    let opcode = match cell.to_ascii_lowercase().as_str() {
        "" | "idle" => return None,
        "noop" => AccelOpcode::Noop,
        "add" => AccelOpcode::Add,
        "sub" => AccelOpcode::Sub,
        "mul" => AccelOpcode::Mul,
        "div" => AccelOpcode::Div,
        "ram" => AccelOpcode::LocalRam,
        "ext" => AccelOpcode::External,
        other => {
            return Some(parse_number(other).ok().filter(|&n| n < 8).map(|n| n as u8));
        }
    };
    Some(Some(opcode as u8))
}

/// Hex (`0x`) or decimal integer; empty cells are zero
pub fn parse_number(cell: &str) -> Result<u64, String> {
    if cell.is_empty() {
        return Ok(0);
    }
    let parsed = match cell.strip_prefix("0x").or_else(|| cell.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => cell.parse::<u64>(),
    };
    parsed.map_err(|_| format!("Invalid number '{}'", cell))
}

/// Trace address columns are 32 bits wide
pub fn parse_address(cell: &str) -> Result<u32, String> {
    let value = parse_number(cell)?;
    u32::try_from(value).map_err(|_| format!("Address '{}' exceeds 32 bits", cell))
}

/// Accelerator word: an integer bit pattern, or a decimal literal
/// with a point (`2.5`) converted by truncation
pub fn parse_operand(cell: &str) -> Result<u16, String> {
    if cell.contains('.') {
        let value: f32 = cell.parse().map_err(|_| format!("Invalid float '{}'", cell))?;
        return Ok(bf16::from_f32(value));
    }
    let value = parse_number(cell)?;
    u16::try_from(value).map_err(|_| format!("Operand '{}' exceeds 16 bits", cell))
}
