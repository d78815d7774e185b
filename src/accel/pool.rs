//! Fixed array of identical execution cores

use super::exec_core::ExecutionCore;
use super::queue::QueueEntry;

/// Lowest-index ready core, re-evaluated every cycle
pub fn select_first_ready(cores: &[ExecutionCore]) -> Option<usize> {
    cores.iter().position(|core| core.is_ready())
}

pub struct ExecutionCorePool {
    cores: Vec<ExecutionCore>,
}

impl ExecutionCorePool {
    pub fn new(count: usize) -> Self {
        Self { cores: (0..count).map(ExecutionCore::new).collect() }
    }

    pub fn select_first_ready(&self) -> Option<usize> {
        select_first_ready(&self.cores)
    }

    pub fn any_ready(&self) -> bool {
        self.select_first_ready().is_some()
    }

    pub fn assign(&mut self, index: usize, entry: QueueEntry) {
        self.cores[index].assign(entry);
    }

    pub fn core(&self, index: usize) -> &ExecutionCore {
        &self.cores[index]
    }

    pub fn cores(&self) -> &[ExecutionCore] {
        &self.cores
    }

    /// Drives a core's enable line
    pub fn set_enable(&mut self, index: usize, enable: bool) {
        self.cores[index].set_enable(enable);
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Advances every core by one cycle
    pub fn tick(&mut self) {
        for core in self.cores.iter_mut() {
            core.tick();
        }
    }
}
