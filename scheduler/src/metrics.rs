//! Turnaround, waiting and response times derived from finished process
//! records.

use serde::Serialize;

use crate::{Pid, ProcessControlBlock, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessMetrics {
    pub pid: Pid,
    pub arrival_time: Timestamp,
    pub burst_time: usize,
    pub io_burst: usize,
    /// Priority as given in the workload
    pub priority: usize,
    pub start_time: Timestamp,
    pub completion_time: Timestamp,
    /// `completion - arrival`
    pub turnaround_time: usize,
    /// `turnaround - burst`, includes time spent blocked on I/O
    pub waiting_time: usize,
    /// `start - arrival`
    pub response_time: usize,
}

impl ProcessMetrics {
    /// Metrics of a completed process, `None` while it is unfinished
    pub fn from_process(pcb: &ProcessControlBlock) -> Option<ProcessMetrics> {
        let completion_time = pcb.completion_time()?;
        let start_time = pcb.start_time()?;
        let turnaround_time = completion_time.since(pcb.arrival_time());

        Some(ProcessMetrics {
            pid: pcb.pid().clone(),
            arrival_time: pcb.arrival_time(),
            burst_time: pcb.burst_time(),
            io_burst: pcb.io_burst(),
            priority: pcb.original_priority(),
            start_time,
            completion_time,
            turnaround_time,
            waiting_time: turnaround_time.saturating_sub(pcb.burst_time()),
            response_time: start_time.since(pcb.arrival_time()),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub processes: Vec<ProcessMetrics>,
    /// Processes the run stopped before they completed
    pub unfinished: Vec<Pid>,
    pub average_turnaround: Option<f64>,
    pub average_waiting: Option<f64>,
    pub average_response: Option<f64>,
}

fn average(values: impl Iterator<Item = usize>) -> Option<f64> {
    let (sum, count) = values.fold((0usize, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum as f64 / count as f64)
}

impl Summary {
    pub fn collect(processes: &[ProcessControlBlock]) -> Summary {
        let mut summary = Summary::default();

        for pcb in processes {
            match ProcessMetrics::from_process(pcb) {
                Some(metrics) => summary.processes.push(metrics),
                None => summary.unfinished.push(pcb.pid().clone()),
            }
        }

        summary.average_turnaround = average(summary.processes.iter().map(|m| m.turnaround_time));
        summary.average_waiting = average(summary.processes.iter().map(|m| m.waiting_time));
        summary.average_response = average(summary.processes.iter().map(|m| m.response_time));
        summary
    }
}
