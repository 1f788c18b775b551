use crate::{Pid, ProcessControlBlock, SchedulerError};

/// Processes blocked on simulated I/O, in the order they blocked
#[derive(Default)]
pub struct IoPool {
    blocked: Vec<usize>,
}

impl IoPool {
    pub fn new() -> IoPool {
        IoPool::default()
    }

    pub fn insert(&mut self, proc: usize) {
        self.blocked.push(proc);
    }

    pub fn remove(&mut self, proc: usize) -> bool {
        match self.blocked.iter().position(|&blocked| blocked == proc) {
            Some(position) => {
                self.blocked.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, proc: usize) -> bool {
        self.blocked.contains(&proc)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocked.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    /// Counts down every pending I/O by `elapsed` units
    pub fn advance(&self, arena: &mut [ProcessControlBlock], elapsed: usize) -> Result<(), SchedulerError> {
        for &proc in self.blocked.iter() {
            arena[proc].advance_io(elapsed)?;
        }
        Ok(())
    }

    /// Processes whose I/O is done, in blocking order
    pub fn finished(&self, arena: &[ProcessControlBlock]) -> Vec<usize> {
        self.blocked
            .iter()
            .copied()
            .filter(|&proc| arena[proc].remaining_io() == 0)
            .collect()
    }

    /// The process closest to finishing its I/O and the time it still needs
    pub fn soonest_completion(&self, arena: &[ProcessControlBlock]) -> Option<(usize, usize)> {
        self.blocked
            .iter()
            .map(|&proc| (proc, arena[proc].remaining_io()))
            .min_by_key(|&(_, remaining)| remaining)
    }

    pub fn snapshot(&self, arena: &[ProcessControlBlock]) -> Vec<Pid> {
        self.blocked
            .iter()
            .map(|&proc| arena[proc].pid().clone())
            .collect()
    }
}
