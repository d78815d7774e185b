//! Top-level protocol state machine.
//!
//! The controller is the only owner of the queue pointers and of core
//! assignment. Each `tick` evaluates one cycle: the controller reads the
//! registered outputs of the queue and cores, takes at most one transition,
//! then the queue captures any arithmetic host request and every core
//! advances one micro-step.

use log::debug;
use log::trace;

use super::host::HostRequest;
use super::host::HostResponse;
use super::pool::ExecutionCorePool;
use super::queue::OperationQueue;
use super::queue::QueueEntry;
use super::AccelOpcode;
use super::AcceleratorConfig;
use super::Status;
use crate::memory::external::ExternalMemoryPort;
use crate::memory::external::ExternalRequest;
use crate::memory::local_ram::LocalRamPort;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    HostRequest,
    LocalRamRead,
    LocalRamWrite,
    ExternalMemRead,
    ExternalMemWrite,
    Dispatch,
    AwaitCore,
}

impl ControllerState {
    /// States in which a host request is being handled
    pub fn serves_host(self) -> bool {
        use ControllerState::*;
        matches!(
            self,
            HostRequest | LocalRamRead | LocalRamWrite | ExternalMemRead | ExternalMemWrite
        )
    }
}

/// One completed arithmetic request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Completion {
    pub core: usize,
    pub entry: QueueEntry,
    pub result: u16,
    pub status: Status,
    pub dispatch_cycle: u64,
    pub complete_cycle: u64,
}

/// History module
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AcceleratorHistory {
    pub cycle_count: u64,
    pub enqueued: u64,
    /// Requests lost to a full queue; never signalled to the host
    pub dropped: u64,
    pub dispatched: u64,
    pub completed: u64,
    pub errors: u64,
}

pub struct AcceleratorController {
    pub config: AcceleratorConfig,
    state: ControllerState,
    queue: OperationQueue,
    pool: ExecutionCorePool,

    /// Latched host request awaiting HOST_REQUEST
    pending: Option<HostRequest>,
    /// Request being handled
    current: HostRequest,
    assigned_core: Option<usize>,
    assigned_entry: Option<(QueueEntry, u64)>,
    ext_lines: ExternalRequest,

    result: u16,
    status: Status,

    pub history: AcceleratorHistory,
    /// First `config.completion_log` completions, oldest first
    pub completions: Vec<Completion>,
}

impl AcceleratorController {
    pub fn new(config: AcceleratorConfig) -> Self {
        Self {
            config,
            state: ControllerState::Idle,
            queue: OperationQueue::new(config.queue_capacity),
            pool: ExecutionCorePool::new(config.core_count),
            pending: None,
            current: HostRequest::idle(),
            assigned_core: None,
            assigned_entry: None,
            ext_lines: ExternalRequest::default(),
            result: 0,
            status: Status::Success,
            history: AcceleratorHistory::default(),
            completions: Vec::new(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn queue(&self) -> &OperationQueue {
        &self.queue
    }

    pub fn pool(&self) -> &ExecutionCorePool {
        &self.pool
    }

    /// Access to the core enable lines
    pub fn pool_mut(&mut self) -> &mut ExecutionCorePool {
        &mut self.pool
    }

    pub fn assigned_core(&self) -> Option<usize> {
        self.assigned_core
    }

    pub fn result(&self) -> u16 {
        self.result
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Idle with nothing pending or queued
    pub fn is_drained(&self) -> bool {
        self.state == ControllerState::Idle && self.pending.is_none() && self.queue.is_empty()
    }

    /// Advances one cycle
    pub fn tick(
        &mut self,
        request: &HostRequest,
        ram: &mut impl LocalRamPort,
        ext: &mut impl ExternalMemoryPort,
    ) -> HostResponse {
        let cycle = self.history.cycle_count;
        let ext_response = ext.cycle(&self.ext_lines);

        if request.valid && self.pending.is_none() {
            self.pending = Some(*request);
        }

        let before = self.state;
        let next = match self.state {
            ControllerState::Idle => {
                if let Some(pending) = self.pending.take() {
                    self.current = pending;
                    ControllerState::HostRequest
                } else if !self.queue.is_empty() && self.pool.any_ready() {
                    ControllerState::Dispatch
                } else {
                    ControllerState::Idle
                }
            }
            ControllerState::HostRequest => self.classify(),
            ControllerState::LocalRamRead => {
                self.result = ram.access(self.current.local_ram_addr, false, 0);
                self.status = Status::Success;
                ControllerState::Idle
            }
            ControllerState::LocalRamWrite => {
                ram.access(self.current.local_ram_addr, true, self.current.operand_a);
                self.status = Status::Success;
                ControllerState::Idle
            }
            ControllerState::ExternalMemRead | ControllerState::ExternalMemWrite => {
                if ext_response.ack {
                    if self.state == ControllerState::ExternalMemRead {
                        self.result = ext_response.read_data;
                    }
                    self.ext_lines = ExternalRequest::default();
                    self.status = Status::Success;
                    ControllerState::Idle
                } else {
                    self.state
                }
            }
            ControllerState::Dispatch => self.dispatch(cycle),
            ControllerState::AwaitCore => self.await_core(cycle),
        };
        if next != before {
            trace!("cycle {}: {:?} -> {:?}", cycle, before, next);
        }
        self.state = next;

        // The queue's own enqueue logic
        let opcode = request.accel_opcode();
        if request.valid && opcode.is_arithmetic() {
            if self.queue.enqueue(opcode, request.operand_a, request.operand_b) {
                self.history.enqueued += 1;
            } else {
                self.history.dropped += 1;
            }
        }

        self.pool.tick();
        self.history.cycle_count += 1;

        HostResponse {
            ack: before == ControllerState::HostRequest,
            busy: self.state.serves_host(),
            result_out: self.result,
            status: self.status,
        }
    }

    /// HOST_REQUEST: route by opcode
    fn classify(&mut self) -> ControllerState {
        let request = self.current;
        match request.accel_opcode() {
            // Already captured by the queue
            AccelOpcode::Add | AccelOpcode::Sub | AccelOpcode::Mul | AccelOpcode::Div => {
                ControllerState::Idle
            }
            AccelOpcode::LocalRam if request.write => ControllerState::LocalRamWrite,
            AccelOpcode::LocalRam => ControllerState::LocalRamRead,
            AccelOpcode::External => {
                self.ext_lines = ExternalRequest {
                    request: true,
                    write: request.write,
                    address: request.external_addr,
                    write_data: request.external_write_data,
                };
                if request.write {
                    ControllerState::ExternalMemWrite
                } else {
                    ControllerState::ExternalMemRead
                }
            }
            AccelOpcode::Noop | AccelOpcode::Reserved => {
                debug!("rejecting host opcode {}", request.opcode);
                self.status = Status::Error;
                ControllerState::Idle
            }
        }
    }

    /// DISPATCH: bind the queue head to the first ready core,
    /// busy-waiting while none is ready
    fn dispatch(&mut self, cycle: u64) -> ControllerState {
        let Some(index) = self.pool.select_first_ready() else {
            return ControllerState::Dispatch;
        };
        let Some(entry) = self.queue.pop() else {
            return ControllerState::Idle;
        };
        debug!("cycle {}: {:?} -> core {}", cycle, entry.opcode, index);
        self.pool.assign(index, entry);
        self.assigned_core = Some(index);
        self.assigned_entry = Some((entry, cycle));
        self.history.dispatched += 1;
        ControllerState::AwaitCore
    }

    fn logs_completion(&self) -> bool {
        self.completions.len() < self.config.completion_log
    }

    /// AWAIT_CORE: capture the assigned core's result
    fn await_core(&mut self, cycle: u64) -> ControllerState {
        let Some(index) = self.assigned_core else {
            return ControllerState::Idle;
        };
        let core = self.pool.core(index);
        if !core.result_valid() {
            return ControllerState::AwaitCore;
        }
        self.result = core.result();
        self.status = core.status();
        debug!("cycle {}: core {} returned {:#06x} ({:?})", cycle, index, self.result, self.status);

        self.history.completed += 1;
        if self.status == Status::Error {
            self.history.errors += 1;
        }
        let entry = self.assigned_entry.take();
        if let Some((entry, dispatch_cycle)) = entry.filter(|_| self.logs_completion()) {
            self.completions.push(Completion {
                core: index,
                entry,
                result: self.result,
                status: self.status,
                dispatch_cycle,
                complete_cycle: cycle,
            });
        }
        self.assigned_core = None;
        ControllerState::Idle
    }
}
