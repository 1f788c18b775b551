// Hand-computed MLFQ runs, checked tick by tick.

use mlfq_scheduler::recorder::LogAction;
use mlfq_scheduler::{
    build_processes, mlfq, Level, MlfqConfig, Pid, ProcessSpec, Schedule, Scheduler, Timestamp,
};

fn config(level_quanta: &[usize], aging_threshold: usize) -> MlfqConfig {
    MlfqConfig {
        level_quanta: level_quanta.to_vec(),
        aging_threshold,
        time_ceiling: 100,
        io_portions: 2,
    }
}

fn segments(schedule: &Schedule) -> Vec<(String, usize, usize)> {
    schedule
        .timeline
        .iter()
        .map(|segment| (segment.pid.to_string(), segment.start.get(), segment.end.get()))
        .collect()
}

fn seg(pid: &str, start: usize, end: usize) -> (String, usize, usize) {
    (pid.to_string(), start, end)
}

#[test]
fn single_process_runs_in_one_slice() {
    let mut procs = build_processes(&[ProcessSpec::new("P1", 0, 5, 0, 1)]);
    let schedule = mlfq(config(&[5], 10)).unwrap().schedule(&mut procs).unwrap();

    assert_eq!(segments(&schedule), vec![seg("P1", 0, 5)]);
    assert_eq!(procs[0].completion_time(), Some(Timestamp::new(5)));
    assert_eq!(procs[0].start_time(), Some(Timestamp::new(0)));
    assert_eq!(procs[0].wait_time(), 0);
    assert!(!schedule.truncated);
}

#[test]
fn same_arrival_processes_share_the_lowest_level() {
    let mut procs = build_processes(&[
        ProcessSpec::new("A", 0, 4, 0, 1),
        ProcessSpec::new("B", 0, 4, 0, 1),
    ]);
    let schedule = mlfq(config(&[2], 10)).unwrap().schedule(&mut procs).unwrap();

    assert_eq!(
        segments(&schedule),
        vec![seg("A", 0, 2), seg("B", 2, 4), seg("A", 4, 6), seg("B", 6, 8)]
    );
    assert_eq!(procs[0].completion_time(), Some(Timestamp::new(6)));
    assert_eq!(procs[1].completion_time(), Some(Timestamp::new(8)));
    assert_eq!(procs[0].remaining_time(), 0);
    assert_eq!(procs[1].remaining_time(), 0);
    assert_eq!(procs[0].wait_time(), 2);
    assert_eq!(procs[1].wait_time(), 4);

    let requeues = schedule.log.with_action(LogAction::QuantumExceededRequeue).count();
    assert_eq!(requeues, 2);
    assert_eq!(schedule.finished_at, Timestamp::new(8));
}

#[test]
fn waiting_process_is_aged_at_the_threshold_tick() {
    let mut procs = build_processes(&[
        ProcessSpec::new("A", 0, 3, 0, 2),
        ProcessSpec::new("B", 0, 2, 0, 1),
        ProcessSpec::new("D", 0, 3, 0, 2),
    ]);
    let schedule = mlfq(config(&[1, 3], 3)).unwrap().schedule(&mut procs).unwrap();

    let promotions: Vec<_> = schedule.log.with_action(LogAction::AgingPromotion).collect();
    assert_eq!(promotions.len(), 1);

    let promotion = promotions[0];
    assert_eq!(promotion.time, Timestamp::new(3));
    assert_eq!(promotion.pid, Some(Pid::new("B")));
    assert_eq!(promotion.from_level, Some(Level::new(0)));
    assert_eq!(promotion.to_level, Some(Level::new(1)));
    assert_eq!(
        promotion.queue(Level::new(1)),
        Some(&[Pid::new("B"), Pid::new("D")][..])
    );
    assert_eq!(promotion.queue(Level::new(0)), Some(&[][..]));

    assert_eq!(
        segments(&schedule),
        vec![seg("A", 0, 3), seg("B", 3, 5), seg("D", 5, 8)]
    );
    assert_eq!(procs[1].current_priority(), 2);
    assert_eq!(procs[1].wait_time(), 3);
    assert_eq!(procs[2].wait_time(), 5);
}

#[test]
fn full_quantum_degrades_one_level() {
    let mut procs = build_processes(&[ProcessSpec::new("A", 0, 6, 0, 2)]);
    let schedule = mlfq(config(&[2, 4], 10)).unwrap().schedule(&mut procs).unwrap();

    let degradation = schedule
        .log
        .with_action(LogAction::QuantumExceededDegradation)
        .next()
        .unwrap();
    assert_eq!(degradation.time, Timestamp::new(4));
    assert_eq!(degradation.from_level, Some(Level::new(1)));
    assert_eq!(degradation.to_level, Some(Level::new(0)));
    assert_eq!(degradation.queue(Level::new(0)), Some(&[Pid::new("A")][..]));

    assert_eq!(segments(&schedule), vec![seg("A", 0, 4), seg("A", 4, 6)]);
    assert_eq!(procs[0].current_priority(), 1);
}

#[test]
fn idle_cpu_jumps_to_next_arrival() {
    let mut procs = build_processes(&[ProcessSpec::new("A", 3, 2, 0, 1)]);
    let schedule = mlfq(config(&[2], 10)).unwrap().schedule(&mut procs).unwrap();

    let actions: Vec<(usize, LogAction)> = schedule
        .log
        .iter()
        .map(|entry| (entry.time.get(), entry.action))
        .collect();
    assert_eq!(
        actions,
        vec![
            (3, LogAction::IdleTimeEnd),
            (3, LogAction::Arrival),
            (5, LogAction::Completed),
        ]
    );
    assert_eq!(procs[0].start_time(), Some(Timestamp::new(3)));
}

#[test]
fn io_counts_down_while_others_run() {
    let mut procs = build_processes(&[
        ProcessSpec::new("A", 0, 8, 3, 2),
        ProcessSpec::new("B", 0, 6, 0, 1),
    ]);
    let schedule = mlfq(config(&[2, 4], 20)).unwrap().schedule(&mut procs).unwrap();

    // A blocks after half its burst; B runs on L1 while A is in I/O
    assert_eq!(
        segments(&schedule),
        vec![
            seg("A", 0, 4),
            seg("B", 4, 6),
            seg("B", 6, 8),
            seg("A", 8, 12),
            seg("B", 12, 14),
        ]
    );

    let blocked = schedule.log.with_action(LogAction::IoBlocked).next().unwrap();
    assert_eq!(blocked.time, Timestamp::new(4));
    assert_eq!(blocked.io_pool, vec![Pid::new("A")]);

    let back = schedule
        .log
        .with_action(LogAction::IoCompleteRequeue)
        .next()
        .unwrap();
    assert_eq!(back.time, Timestamp::new(8));
    assert_eq!(back.to_level, Some(Level::new(1)));
    assert!(back.io_pool.is_empty());

    assert_eq!(procs[0].completion_time(), Some(Timestamp::new(12)));
    assert_eq!(procs[0].io_count(), 1);
    assert_eq!(procs[1].completion_time(), Some(Timestamp::new(14)));
}

#[test]
fn idle_jump_to_arrival_counts_down_pending_io() {
    let mut procs = build_processes(&[
        ProcessSpec::new("A", 0, 4, 5, 1),
        ProcessSpec::new("B", 10, 1, 0, 1),
    ]);
    let schedule = mlfq(config(&[2], 10)).unwrap().schedule(&mut procs).unwrap();

    // A's I/O ends at 7, but the clock only stops at B's arrival
    let actions: Vec<(usize, LogAction, Option<Pid>)> = schedule
        .log
        .iter()
        .map(|entry| (entry.time.get(), entry.action, entry.pid.clone()))
        .collect();
    assert_eq!(
        &actions[..5],
        &[
            (0, LogAction::Arrival, Some(Pid::new("A"))),
            (2, LogAction::IoBlocked, Some(Pid::new("A"))),
            (10, LogAction::IdleTimeEnd, None),
            (10, LogAction::Arrival, Some(Pid::new("B"))),
            (10, LogAction::IoCompleteRequeue, Some(Pid::new("A"))),
        ][..]
    );

    let idle = &schedule.log.entries()[2];
    assert_eq!(idle.io_pool, vec![Pid::new("A")]);
    let requeue = &schedule.log.entries()[4];
    assert_eq!(
        requeue.queue(Level::new(0)),
        Some(&[Pid::new("B"), Pid::new("A")][..])
    );
    assert!(requeue.io_pool.is_empty());

    assert_eq!(
        segments(&schedule),
        vec![seg("A", 0, 2), seg("B", 10, 11), seg("A", 11, 13)]
    );
    assert_eq!(procs[0].completion_time(), Some(Timestamp::new(13)));
}

#[test]
fn io_time_advance_stops_at_the_soonest_completion() {
    let mut procs = build_processes(&[
        ProcessSpec::new("A", 0, 2, 6, 1),
        ProcessSpec::new("B", 0, 2, 3, 1),
    ]);
    let schedule = mlfq(config(&[1], 10)).unwrap().schedule(&mut procs).unwrap();

    let advances: Vec<_> = schedule.log.with_action(LogAction::IoTimeAdvance).collect();
    assert_eq!(advances.len(), 2);
    // A blocked at 1 for 6 and B at 2 for 3: B is done first, at 5
    assert_eq!(advances[0].time, Timestamp::new(5));
    assert_eq!(advances[0].io_pool, vec![Pid::new("A"), Pid::new("B")]);
    assert_eq!(advances[1].time, Timestamp::new(7));

    let returns: Vec<(usize, Pid)> = schedule
        .log
        .with_action(LogAction::IoCompleteRequeue)
        .map(|entry| (entry.time.get(), entry.pid.clone().unwrap()))
        .collect();
    assert_eq!(returns, vec![(5, Pid::new("B")), (7, Pid::new("A"))]);

    assert_eq!(
        segments(&schedule),
        vec![seg("A", 0, 1), seg("B", 1, 2), seg("B", 5, 6), seg("A", 7, 8)]
    );
    assert_eq!(procs[0].io_count(), 1);
    assert_eq!(procs[1].io_count(), 1);
}
