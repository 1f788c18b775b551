// FCFS and round robin share the process model and timeline shape.

use std::num::NonZeroUsize;

use mlfq_scheduler::metrics::Summary;
use mlfq_scheduler::{build_processes, fcfs, round_robin, ProcessSpec, Scheduler, Timestamp};

fn spans(schedule: &mlfq_scheduler::Schedule) -> Vec<(String, usize, usize)> {
    schedule
        .timeline
        .iter()
        .map(|segment| (segment.pid.to_string(), segment.start.get(), segment.end.get()))
        .collect()
}

fn span(pid: &str, start: usize, end: usize) -> (String, usize, usize) {
    (pid.to_string(), start, end)
}

#[test]
fn fcfs_runs_whole_bursts_in_arrival_order() {
    let mut procs = build_processes(&[
        ProcessSpec::new("B", 5, 2, 0, 1),
        ProcessSpec::new("A", 0, 3, 0, 1),
        ProcessSpec::new("C", 5, 1, 0, 1),
    ]);
    let schedule = fcfs().schedule(&mut procs).unwrap();

    assert_eq!(
        spans(&schedule),
        vec![span("A", 0, 3), span("B", 5, 7), span("C", 7, 8)]
    );
    assert!(schedule.log.is_empty());
    assert_eq!(procs[2].wait_time(), 2);
    assert_eq!(procs[2].completion_time(), Some(Timestamp::new(8)));
    assert_eq!(schedule.finished_at, Timestamp::new(8));
}

#[test]
fn round_robin_queues_arrivals_before_the_preempted_process() {
    let mut procs = build_processes(&[
        ProcessSpec::new("A", 0, 5, 0, 1),
        ProcessSpec::new("B", 1, 3, 0, 1),
    ]);
    let mut scheduler = round_robin(NonZeroUsize::new(2).unwrap());
    let schedule = scheduler.schedule(&mut procs).unwrap();

    assert_eq!(
        spans(&schedule),
        vec![
            span("A", 0, 2),
            span("B", 2, 4),
            span("A", 4, 6),
            span("B", 6, 7),
            span("A", 7, 8),
        ]
    );
    assert_eq!(procs[0].completion_time(), Some(Timestamp::new(8)));
    assert_eq!(procs[1].completion_time(), Some(Timestamp::new(7)));
    assert_eq!(procs[1].start_time(), Some(Timestamp::new(2)));
}

#[test]
fn round_robin_skips_idle_gaps() {
    let mut procs = build_processes(&[
        ProcessSpec::new("A", 0, 1, 0, 1),
        ProcessSpec::new("B", 4, 2, 0, 1),
    ]);
    let schedule = round_robin(NonZeroUsize::new(3).unwrap())
        .schedule(&mut procs)
        .unwrap();

    assert_eq!(spans(&schedule), vec![span("A", 0, 1), span("B", 4, 6)]);
}

#[test]
fn metrics_match_the_baseline_run() {
    let mut procs = build_processes(&[
        ProcessSpec::new("A", 0, 4, 0, 1),
        ProcessSpec::new("B", 1, 2, 0, 1),
    ]);
    fcfs().schedule(&mut procs).unwrap();

    let summary = Summary::collect(&procs);
    assert_eq!(summary.processes[1].turnaround_time, 5);
    assert_eq!(summary.processes[1].waiting_time, 3);
    assert_eq!(summary.processes[1].response_time, 3);
    assert_eq!(summary.average_turnaround, Some(4.5));
}
