use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to load input: {0}")]
    LoadError(#[from] LoadError),

    #[error("Execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("Memory error: {0}")]
    MemoryError(#[from] MemoryError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Errors related to program and trace files
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse '{0}': {1}")]
    ParseError(PathBuf, String),

    #[error("Program '{0}' contains no instructions")]
    EmptyProgram(PathBuf),
}

/// Errors raised by driver loops around the cycle model
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Cycle limit reached: {0} cycles")]
    CycleLimitReached(u64),
}

/// Errors related to memory operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Memory access error at address {address:#018x}: {kind}")]
    AccessError { address: u64, kind: MemoryErrorKind },
}

/// Specific kinds of memory errors
#[derive(Error, Debug)]
pub enum MemoryErrorKind {
    #[error("Attempted to read from unallocated memory")]
    ReadUnallocated,

    #[error("Attempted to access memory outside addressable range")]
    OutOfBounds,
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
