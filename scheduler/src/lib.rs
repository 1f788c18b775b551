//! A scheduler simulation library.
//!
//! This library simulates CPU scheduling of a fixed set of processes on a
//! logical clock. The multilevel feedback queue scheduler is the main
//! policy; first come first served and round robin are provided as
//! baselines sharing the same process model and outputs.
//!

use std::num::NonZeroUsize;

mod schedulers;

pub use schedulers::{FcfsScheduler, IoPool, MlfqScheduler, QueueSet, RoundRobinScheduler};

mod scheduler;
pub use crate::scheduler::{Schedule, Scheduler};

mod common_types;
pub use crate::common_types::{Level, Pid, Timestamp};

mod error;
pub use crate::error::{ConfigError, SchedulerError};

pub mod config;
pub use crate::config::{MlfqConfig, ProcessSpec, Workload};

mod collector;
pub use crate::collector::{check_partition, collect_all, Collector};

mod process_control_block;
pub use process_control_block::{ProcessControlBlock, ProcessState};

mod scheduler_info;
pub use crate::scheduler_info::SchedulerInfo;

pub mod metrics;
pub mod recorder;

/// Builds one fresh process record per description, in input order
pub fn build_processes(specs: &[ProcessSpec]) -> Vec<ProcessControlBlock> {
    specs.iter().map(ProcessControlBlock::new).collect()
}

/// Returns a structure that implements the `Scheduler` trait with a multilevel
/// feedback queue policy
///
/// * `config` - per-level quanta, aging threshold, time ceiling and I/O
///              portions; rejected up front when malformed
pub fn mlfq(config: MlfqConfig) -> Result<MlfqScheduler, SchedulerError> {
    MlfqScheduler::new(config)
}

/// Returns a structure that implements the `Scheduler` trait with a round robin
/// scheduler policy
///
/// * `timeslice` - the time quanta that a process can run before it is preempted
pub fn round_robin(timeslice: NonZeroUsize) -> impl Scheduler {
    RoundRobinScheduler::new(timeslice)
}

/// Returns a structure that implements the `Scheduler` trait with a first come,
/// first served policy
pub fn fcfs() -> impl Scheduler {
    FcfsScheduler::new()
}
