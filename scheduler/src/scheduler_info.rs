use crate::{MlfqConfig, ProcessControlBlock, Timestamp};

/// The explicit context of one run
///
/// Holds the logical clock, the arrival cursor and the configuration, and is
/// handed to every phase of the loop instead of living in shared state.
pub struct SchedulerInfo<'a> {
    /// Current tick
    timestamp: Timestamp,
    /// Arena indices in stable arrival order
    arrivals: Vec<usize>,
    /// Position of the next process that has not arrived yet
    next_arrival: usize,
    config: &'a MlfqConfig,
}

impl<'a> SchedulerInfo<'a> {
    pub fn new(config: &'a MlfqConfig, arena: &[ProcessControlBlock]) -> SchedulerInfo<'a> {
        SchedulerInfo {
            timestamp: Timestamp::new(0),
            arrivals: arrival_order(arena),
            next_arrival: 0,
            config,
        }
    }

    pub fn config(&self) -> &'a MlfqConfig {
        self.config
    }

    pub fn get_timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn make_timeskip(&mut self, time: usize) {
        self.timestamp = self.timestamp + time;
    }

    pub fn reached_ceiling(&self) -> bool {
        self.timestamp.get() >= self.config.time_ceiling
    }

    /// The next process to arrive, whether or not it is due yet
    pub fn peek_arrival(&self) -> Option<usize> {
        self.arrivals.get(self.next_arrival).copied()
    }

    /// Takes the next process whose arrival time has been reached
    pub fn pop_due_arrival(&mut self, arena: &[ProcessControlBlock]) -> Option<usize> {
        let proc = self.peek_arrival()?;
        if arena[proc].arrival_time() > self.timestamp {
            return None;
        }

        self.next_arrival += 1;
        Some(proc)
    }

    pub fn has_pending_arrivals(&self) -> bool {
        self.next_arrival < self.arrivals.len()
    }

    /// Arena indices of the processes that have not arrived yet
    pub fn pending(&self) -> &[usize] {
        &self.arrivals[self.next_arrival..]
    }
}

/// Arena indices sorted by arrival time; ties keep input order
pub fn arrival_order(arena: &[ProcessControlBlock]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..arena.len()).collect();
    order.sort_by_key(|&proc| arena[proc].arrival_time());
    order
}
