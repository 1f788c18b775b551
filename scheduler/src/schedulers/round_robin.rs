use std::collections::VecDeque;
use std::num::NonZeroUsize;

use log::{debug, info, trace};

use crate::config::validate_processes;
use crate::recorder::{RunLog, Timeline};
use crate::scheduler_info::arrival_order;
use crate::{ProcessControlBlock, ProcessSpec, Schedule, Scheduler, SchedulerError, Timestamp};

/// Plain round robin over a single FIFO ready queue
pub struct RoundRobinScheduler {
    /// The maximum time a process can run before being preempted
    quanta: NonZeroUsize,
}

impl RoundRobinScheduler {
    pub fn new(timeslice: NonZeroUsize) -> RoundRobinScheduler {
        RoundRobinScheduler { quanta: timeslice }
    }
}

/// Moves every process whose arrival time has come into the ready queue
fn admit(
    processes: &mut [ProcessControlBlock],
    order: &[usize],
    next: &mut usize,
    ready: &mut VecDeque<usize>,
    timestamp: Timestamp,
) -> Result<(), SchedulerError> {
    while let Some(&proc) = order.get(*next) {
        if processes[proc].arrival_time() > timestamp {
            break;
        }

        processes[proc].arrive()?;
        ready.push_back(proc);
        *next += 1;
    }
    Ok(())
}

impl Scheduler for RoundRobinScheduler {
    fn name(&self) -> &'static str {
        "rr"
    }

    fn schedule(&mut self, processes: &mut [ProcessControlBlock]) -> Result<Schedule, SchedulerError> {
        let specs: Vec<ProcessSpec> = processes.iter().map(ProcessControlBlock::spec).collect();
        validate_processes(&specs, None)?;

        for pcb in processes.iter_mut() {
            pcb.reset();
        }

        info!("rr: {} processes, quantum {}", processes.len(), self.quanta);

        let order = arrival_order(processes);
        let mut next = 0;
        let mut ready: VecDeque<usize> = VecDeque::new();
        let mut timeline = Timeline::new();
        let mut timestamp = Timestamp::new(0);

        loop {
            admit(processes, &order, &mut next, &mut ready, timestamp)?;

            let Some(proc) = ready.pop_front() else {
                match order.get(next) {
                    Some(&upcoming) => {
                        debug!("t={} idle until {}", timestamp, processes[upcoming].arrival_time());
                        timestamp = processes[upcoming].arrival_time();
                        continue;
                    }
                    None => break,
                }
            };

            processes[proc].dispatch(timestamp)?;
            let exec_time = self.quanta.get().min(processes[proc].remaining_time());
            processes[proc].run(exec_time)?;
            timeline.record(processes[proc].pid(), timestamp, timestamp + exec_time)?;
            for &waiting in ready.iter() {
                processes[waiting].add_wait(exec_time)?;
            }
            timestamp = timestamp + exec_time;
            trace!("t={} {} ran {}", timestamp, processes[proc].pid(), exec_time);

            // arrivals during the slice queue up ahead of the preempted process
            admit(processes, &order, &mut next, &mut ready, timestamp)?;

            if processes[proc].remaining_time() > 0 {
                processes[proc].requeue(timestamp)?;
                ready.push_back(proc);
            } else {
                processes[proc].complete(timestamp)?;
                debug!("t={} {} completed", timestamp, processes[proc].pid());
            }
        }

        Ok(Schedule {
            timeline,
            log: RunLog::new(),
            finished_at: timestamp,
            truncated: false,
        })
    }
}
