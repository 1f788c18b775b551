use serde::Serialize;

use crate::recorder::{RunLog, Timeline};
use crate::{ProcessControlBlock, SchedulerError, Timestamp};

/// The outputs of one run, handed to reporting once the loop is over
#[derive(Clone, Debug, Default, Serialize)]
pub struct Schedule {
    pub timeline: Timeline,
    pub log: RunLog,
    /// Clock value when the loop stopped
    pub finished_at: Timestamp,
    /// Set when the time ceiling stopped the run with work left
    pub truncated: bool,
}

/// A scheduling policy that simulates a fixed set of processes
pub trait Scheduler {
    fn name(&self) -> &'static str;

    /// Simulates `processes` from tick 0 until they all complete or the
    /// policy stops
    ///
    /// Input is validated first and rejected without touching any record.
    /// Every record is then reset, so the same records can be scheduled
    /// again under another policy.
    fn schedule(&mut self, processes: &mut [ProcessControlBlock]) -> Result<Schedule, SchedulerError>;
}
