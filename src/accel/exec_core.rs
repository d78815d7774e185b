//! Execution core: a multi-cycle arithmetic state machine on accelerator words.
//!
//! Timing after assignment: add/sub 1 cycle, multiply 2 cycles,
//! divide 10 cycles (setup, 8 non-restoring steps, correction),
//! anything else 1 cycle with a zero result.

use log::debug;
use log::trace;
use log::warn;

use super::bf16;
use super::queue::QueueEntry;
use super::AccelOpcode;
use super::Status;

/// Result word reported on divide-by-zero
pub const DIV_ZERO_RESULT: u16 = 0xffff;

const DIVIDE_STEPS: u8 = 8;

/// Micro-step state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoreState {
    Ready,
    AddSub,
    /// Multiply, cycle index
    Multiply(u8),
    /// Divide, cycle index
    Divide(u8),
    Noop,
    /// Result valid for one cycle; eligible for reassignment
    Done,
}

/// Session state of one core
pub struct ExecutionCore {
    pub id: usize,
    state: CoreState,
    enable: bool,
    /// Assignment presented this cycle
    start: Option<QueueEntry>,

    opcode: AccelOpcode,
    operand_a: u16,
    operand_b: u16,
    sign: u16,
    exponent: i32,
    /// Working significand, 16 bits
    mantissa: u32,
    remainder: i32,
    quotient: u32,
    divisor: i32,
    cycle_counter: u32,

    result: u16,
    result_valid: bool,
    status: Status,
}

impl ExecutionCore {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: CoreState::Ready,
            enable: true,
            start: None,
            opcode: AccelOpcode::Noop,
            operand_a: 0,
            operand_b: 0,
            sign: 0,
            exponent: 0,
            mantissa: 0,
            remainder: 0,
            quotient: 0,
            divisor: 0,
            cycle_counter: 0,
            result: 0,
            result_valid: false,
            status: Status::Success,
        }
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        !matches!(self.state, CoreState::Ready | CoreState::Done) || self.start.is_some()
    }

    /// Idle, enabled and not already claimed this cycle
    pub fn is_ready(&self) -> bool {
        self.enable && !self.is_busy()
    }

    pub fn result_valid(&self) -> bool {
        self.result_valid
    }

    pub fn result(&self) -> u16 {
        self.result
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Cycles spent in the current or last session
    pub fn cycle_counter(&self) -> u32 {
        self.cycle_counter
    }

    pub fn enabled(&self) -> bool {
        self.enable
    }

    pub fn set_enable(&mut self, enable: bool) {
        self.enable = enable;
    }

    /// Presents a request; latched on the next tick
    pub fn assign(&mut self, entry: QueueEntry) {
        self.start = Some(entry);
    }

    /// Advances exactly one cycle
    pub fn tick(&mut self) {
        self.result_valid = false;

        if !self.enable {
            if self.is_busy() {
                debug!("core {}: disabled, abandoning {:?}", self.id, self.opcode);
            }
            self.start = None;
            self.state = CoreState::Ready;
            return;
        }

        if let Some(entry) = self.start.take() {
            self.begin(entry);
            return;
        }

        trace!("core {}: {:?}", self.id, self.state);
        match self.state {
            CoreState::Ready | CoreState::Done => {
                self.state = CoreState::Ready;
                return;
            }
            CoreState::AddSub => self.add_sub(),
            CoreState::Multiply(0) => {
                self.multiply_product();
                self.state = CoreState::Multiply(1);
            }
            CoreState::Multiply(_) => {
                let product = bf16::normalize(self.sign, self.exponent, self.mantissa);
                self.finish(product, Status::Success)
            }
            CoreState::Divide(0) => self.divide_setup(),
            CoreState::Divide(n) if n <= DIVIDE_STEPS => {
                self.divide_step();
                self.state = CoreState::Divide(n + 1);
            }
            CoreState::Divide(_) => self.divide_finish(),
            CoreState::Noop => self.finish(0, Status::Success),
        }
        self.cycle_counter += 1;
    }

    /// READY -> busy: latch operands and pick the first micro-step
    fn begin(&mut self, entry: QueueEntry) {
        debug!(
            "core {}: begin {:?} {:#06x} {:#06x}",
            self.id, entry.opcode, entry.operand_a, entry.operand_b
        );
        self.opcode = entry.opcode;
        self.operand_a = entry.operand_a;
        self.operand_b = entry.operand_b;
        self.cycle_counter = 0;
        self.status = Status::Success;
        self.state = match entry.opcode {
            AccelOpcode::Add | AccelOpcode::Sub => CoreState::AddSub,
            AccelOpcode::Mul => CoreState::Multiply(0),
            AccelOpcode::Div => CoreState::Divide(0),
            _ => CoreState::Noop,
        };
    }

    fn finish(&mut self, result: u16, status: Status) {
        self.result = result;
        self.status = status;
        self.result_valid = true;
        self.state = CoreState::Done;
        debug!("core {}: result {:#06x} ({:?})", self.id, result, status);
    }

    fn add_sub(&mut self) {
        let mut a = bf16::decompose(self.operand_a);
        let mut b = bf16::decompose(self.operand_b);
        if self.opcode == AccelOpcode::Sub {
            b.sign ^= 1;
        }
        // The larger magnitude anchors the result
        if (a.exponent, a.significand) < (b.exponent, b.significand) {
            std::mem::swap(&mut a, &mut b);
        }
        let shift = (a.exponent - b.exponent) as u32;
        let sig_a = (a.significand as u32) << bf16::WORKING_SHIFT;
        let sig_b = ((b.significand as u32) << bf16::WORKING_SHIFT).checked_shr(shift).unwrap_or(0);

        self.sign = a.sign;
        self.exponent = a.exponent as i32;
        self.mantissa = if a.sign == b.sign { sig_a + sig_b } else { sig_a - sig_b };
        self.finish(bf16::normalize(self.sign, self.exponent, self.mantissa), Status::Success);
    }

    fn multiply_product(&mut self) {
        let a = bf16::decompose(self.operand_a);
        let b = bf16::decompose(self.operand_b);
        self.sign = a.sign ^ b.sign;
        self.exponent = a.exponent as i32 + b.exponent as i32 - bf16::EXPONENT_BIAS;
        // 8x8 -> 16, already at the working position
        self.mantissa = a.significand as u32 * b.significand as u32;
    }

    fn divide_setup(&mut self) {
        let a = bf16::decompose(self.operand_a);
        let b = bf16::decompose(self.operand_b);
        self.sign = a.sign ^ b.sign;
        self.exponent = a.exponent as i32 - b.exponent as i32 + bf16::EXPONENT_BIAS;
        if b.significand == 0 {
            warn!("core {}: divide by zero", self.id);
            self.finish(DIV_ZERO_RESULT, Status::Error);
            return;
        }
        // Dividend shifted by 7, split across remainder:quotient
        let dividend = (a.significand as u32) << bf16::WORKING_SHIFT;
        self.remainder = (dividend >> DIVIDE_STEPS) as i32;
        self.quotient = dividend & 0xff;
        self.divisor = b.significand as i32;
        self.state = CoreState::Divide(1);
    }

    /// One non-restoring step: shift remainder:quotient left, subtract or
    /// add the divisor by the remainder's sign, record the complement of
    /// the new sign as the next quotient bit
    fn divide_step(&mut self) {
        let msb = (self.quotient >> 7) & 0x1;
        let shifted = (self.remainder << 1) | msb as i32;
        self.quotient = (self.quotient << 1) & 0xff;
        self.remainder = if self.remainder >= 0 {
            shifted - self.divisor
        } else {
            shifted + self.divisor
        };
        if self.remainder >= 0 {
            self.quotient |= 1;
        }
    }

    fn divide_finish(&mut self) {
        if self.remainder < 0 {
            self.remainder += self.divisor;
        }
        self.mantissa = self.quotient << bf16::WORKING_SHIFT;
        self.finish(bf16::normalize(self.sign, self.exponent, self.mantissa), Status::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::bf16::{from_f32, to_f32};

    fn entry(opcode: AccelOpcode, a: f32, b: f32) -> QueueEntry {
        QueueEntry { opcode, operand_a: from_f32(a), operand_b: from_f32(b) }
    }

    /// Runs a request to completion, returning (result, status, cycles after latch)
    fn run(core: &mut ExecutionCore, e: QueueEntry) -> (u16, Status, u32) {
        core.assign(e);
        core.tick();
        let mut cycles = 0;
        while !core.result_valid() {
            core.tick();
            cycles += 1;
            assert!(cycles < 100);
        }
        (core.result(), core.status(), cycles)
    }

    #[test]
    fn test_add_sub() {
        let mut core = ExecutionCore::new(0);
        let expected = (from_f32(8.0), Status::Success, 1);
        assert_eq!(run(&mut core, entry(AccelOpcode::Add, 5.0, 3.0)), expected);
        assert_eq!(run(&mut core, entry(AccelOpcode::Sub, 5.0, 3.0)).0, from_f32(2.0));
        assert_eq!(run(&mut core, entry(AccelOpcode::Sub, 3.0, 5.0)).0, from_f32(-2.0));
        assert_eq!(run(&mut core, entry(AccelOpcode::Sub, 5.0, 5.0)).0, 0);
        assert_eq!(run(&mut core, entry(AccelOpcode::Add, 1.5, -0.5)).0, from_f32(1.0));
        assert_eq!(run(&mut core, entry(AccelOpcode::Add, 0.0, 3.0)).0, from_f32(3.0));
    }

    #[test]
    fn test_multiply() {
        let mut core = ExecutionCore::new(0);
        let expected = (from_f32(15.0), Status::Success, 2);
        assert_eq!(run(&mut core, entry(AccelOpcode::Mul, 5.0, 3.0)), expected);
        assert_eq!(run(&mut core, entry(AccelOpcode::Mul, -2.0, 3.0)).0, from_f32(-6.0));
        assert_eq!(run(&mut core, entry(AccelOpcode::Mul, 0.0, 3.0)).0, 0);
    }

    #[test]
    fn test_divide() {
        let mut core = ExecutionCore::new(0);
        let expected = (from_f32(5.0), Status::Success, 10);
        assert_eq!(run(&mut core, entry(AccelOpcode::Div, 15.0, 3.0)), expected);
        assert_eq!(run(&mut core, entry(AccelOpcode::Div, 6.0, 3.0)).0, from_f32(2.0));
        // Truncated 1/3
        let third = run(&mut core, entry(AccelOpcode::Div, 1.0, 3.0)).0;
        assert_eq!(third, 0x3eaa);
        assert!((to_f32(third) - 1.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn test_divide_quotient_matches_integer_division() {
        let mut core = ExecutionCore::new(0);
        for a in (0x3f80u16..0x4000).step_by(7) {
            for b in (0x3f80u16..0x4000).step_by(11) {
                let e = QueueEntry { opcode: AccelOpcode::Div, operand_a: a, operand_b: b };
                let (result, status, _) = run(&mut core, e);
                assert_eq!(status, Status::Success);
                let sa = (0x80 | (a & 0x7f)) as u32;
                let sb = (0x80 | (b & 0x7f)) as u32;
                let q = (sa << 7) / sb;
                let expected = bf16::normalize(0, 127, q << 7);
                assert_eq!(result, expected, "{:#06x} / {:#06x}", a, b);
            }
        }
    }

    #[test]
    fn test_divide_by_zero() {
        let mut core = ExecutionCore::new(0);
        for x in [0.0f32, 1.0, -7.5, 1e10] {
            let (result, status, cycles) = run(&mut core, entry(AccelOpcode::Div, x, 0.0));
            assert_eq!(result, DIV_ZERO_RESULT);
            assert_eq!(status, Status::Error);
            assert_eq!(cycles, 1);
        }
        // Status is scoped to the request
        assert_eq!(run(&mut core, entry(AccelOpcode::Add, 1.0, 1.0)).1, Status::Success);
    }

    #[test]
    fn test_noop_yields_zero() {
        let mut core = ExecutionCore::new(0);
        let e = QueueEntry { opcode: AccelOpcode::Noop, operand_a: 0x4040, operand_b: 0x4040 };
        assert_eq!(run(&mut core, e), (0, Status::Success, 1));
    }

    #[test]
    fn test_ready_lifecycle() {
        let mut core = ExecutionCore::new(0);
        assert!(core.is_ready());
        core.assign(entry(AccelOpcode::Mul, 2.0, 2.0));
        assert!(!core.is_ready());
        core.tick();
        assert!(core.is_busy());
        core.tick();
        core.tick();
        assert!(core.result_valid());
        assert!(core.is_ready());
        core.tick();
        assert!(!core.result_valid());
        assert_eq!(core.state(), CoreState::Ready);
    }

    #[test]
    fn test_disable_abandons() {
        let mut core = ExecutionCore::new(0);
        core.assign(entry(AccelOpcode::Div, 15.0, 3.0));
        core.tick();
        core.tick();
        core.set_enable(false);
        assert!(!core.is_ready());
        core.tick();
        assert_eq!(core.state(), CoreState::Ready);
        assert!(!core.result_valid());
        // Re-enabling does not resume
        core.set_enable(true);
        for _ in 0..12 {
            core.tick();
            assert!(!core.result_valid());
        }
    }
}
