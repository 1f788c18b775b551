use thiserror::Error;

use crate::Pid;

/// Rejections of a workload, detected before a run starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one queue level is required")]
    NoLevels,

    #[error("expected {expected} quanta, one per level, got {got}")]
    QuantaLength { expected: usize, got: usize },

    #[error("quantum of level L{level} must be positive")]
    ZeroQuantum { level: usize },

    #[error("quanta must strictly increase with the level, L{level} has {quantum} after {previous}")]
    QuantaNotIncreasing {
        level: usize,
        quantum: usize,
        previous: usize,
    },

    #[error("aging threshold must be positive")]
    ZeroAgingThreshold,

    #[error("time ceiling must be positive")]
    ZeroTimeCeiling,

    #[error("io portions must be at least 1")]
    ZeroIoPortions,

    #[error("process {pid} has a zero burst time")]
    ZeroBurst { pid: Pid },

    #[error("process {pid} has priority {priority}, valid priorities are 1..={levels}")]
    PriorityOutOfRange {
        pid: Pid,
        priority: usize,
        levels: usize,
    },

    #[error("process id {pid} is used more than once")]
    DuplicatePid { pid: Pid },
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Malformed input, the simulation never started
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A defect in the engine itself; the run's output is meaningless
    #[error("invariant violated for {pid}: {detail}")]
    InvariantViolation { pid: Pid, detail: String },
}

impl SchedulerError {
    pub(crate) fn invariant(pid: &Pid, detail: impl Into<String>) -> SchedulerError {
        SchedulerError::InvariantViolation {
            pid: pid.clone(),
            detail: detail.into(),
        }
    }
}
