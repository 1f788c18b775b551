use log::{debug, info};

use crate::config::validate_processes;
use crate::recorder::{RunLog, Timeline};
use crate::scheduler_info::arrival_order;
use crate::{ProcessControlBlock, ProcessSpec, Schedule, Scheduler, SchedulerError, Timestamp};

/// First come, first served: each process runs its whole burst in arrival
/// order
#[derive(Default)]
pub struct FcfsScheduler;

impl FcfsScheduler {
    pub fn new() -> FcfsScheduler {
        FcfsScheduler
    }
}

impl Scheduler for FcfsScheduler {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn schedule(&mut self, processes: &mut [ProcessControlBlock]) -> Result<Schedule, SchedulerError> {
        let specs: Vec<ProcessSpec> = processes.iter().map(ProcessControlBlock::spec).collect();
        validate_processes(&specs, None)?;

        for pcb in processes.iter_mut() {
            pcb.reset();
        }

        info!("fcfs: {} processes", processes.len());

        let mut timeline = Timeline::new();
        let mut timestamp = Timestamp::new(0);

        for proc in arrival_order(processes) {
            let pcb = &mut processes[proc];

            if timestamp < pcb.arrival_time() {
                debug!("t={} idle until {}", timestamp, pcb.arrival_time());
                timestamp = pcb.arrival_time();
            }

            pcb.arrive()?;
            pcb.add_wait(timestamp.since(pcb.arrival_time()))?;
            pcb.dispatch(timestamp)?;

            let burst = pcb.remaining_time();
            pcb.run(burst)?;
            timeline.record(pcb.pid(), timestamp, timestamp + burst)?;
            timestamp = timestamp + burst;
            pcb.complete(timestamp)?;

            debug!("t={} {} completed", timestamp, pcb.pid());
        }

        Ok(Schedule {
            timeline,
            log: RunLog::new(),
            finished_at: timestamp,
            truncated: false,
        })
    }
}
