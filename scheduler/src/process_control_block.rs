use serde::Serialize;

use crate::{Level, Pid, ProcessSpec, SchedulerError, Timestamp};

/// Lifecycle state of a simulated process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ProcessState {
    NotArrived,
    Ready { level: Level },
    Running { level: Level },
    Blocked,
    Completed,
}

/// The scheduling record of one simulated process
///
/// Only the scheduler mutates a record, and only through the lifecycle
/// operations below. Each operation checks that the process is in the
/// state it expects and reports an `InvariantViolation` otherwise, so a
/// completed process can never be queued, blocked or run again.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessControlBlock {
    /// The identifier given by the workload
    pid: Pid,
    /// Tick at which the process enters the ready queues
    arrival_time: Timestamp,
    /// Total CPU time the process needs
    burst_time: usize,
    /// Length of every I/O episode, 0 for CPU-only processes
    io_burst: usize,
    /// Priority the process was created with (1 is the lowest)
    original_priority: usize,
    /// Priority of the level the process belongs to, or last belonged to
    current_priority: usize,
    /// CPU time left until completion
    remaining_time: usize,
    /// CPU time consumed so far
    service_time: usize,
    /// I/O time left while blocked
    remaining_io: usize,
    /// Time spent in a ready queue while another process was running
    wait_time: usize,
    /// Last tick the process was dispatched or put back in a queue, aging
    /// measures from here
    last_run_time: Timestamp,
    /// Tick of the first dispatch
    start_time: Option<Timestamp>,
    /// Tick at which the last unit of CPU time was consumed
    completion_time: Option<Timestamp>,
    /// Number of I/O episodes triggered so far
    io_count: usize,
    state: ProcessState,
}

impl ProcessControlBlock {
    /// Creates the record of a process that has not arrived yet
    ///
    /// * `spec` - the process description, validated by the caller
    pub fn new(spec: &ProcessSpec) -> ProcessControlBlock {
        ProcessControlBlock {
            pid: spec.pid.clone(),
            arrival_time: Timestamp::new(spec.arrival_time),
            burst_time: spec.burst_time,
            io_burst: spec.io_burst,
            original_priority: spec.priority,
            current_priority: spec.priority,
            remaining_time: spec.burst_time,
            service_time: 0,
            remaining_io: 0,
            wait_time: 0,
            last_run_time: Timestamp::default(),
            start_time: None,
            completion_time: None,
            io_count: 0,
            state: ProcessState::NotArrived,
        }
    }

    /// The description this record was built from
    pub fn spec(&self) -> ProcessSpec {
        ProcessSpec {
            pid: self.pid.clone(),
            arrival_time: self.arrival_time.get(),
            burst_time: self.burst_time,
            io_burst: self.io_burst,
            priority: self.original_priority,
        }
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn arrival_time(&self) -> Timestamp {
        self.arrival_time
    }

    pub fn burst_time(&self) -> usize {
        self.burst_time
    }

    pub fn io_burst(&self) -> usize {
        self.io_burst
    }

    pub fn original_priority(&self) -> usize {
        self.original_priority
    }

    pub fn current_priority(&self) -> usize {
        self.current_priority
    }

    pub fn original_level(&self) -> Level {
        Level::from_priority(self.original_priority)
    }

    pub fn current_level(&self) -> Level {
        Level::from_priority(self.current_priority)
    }

    pub fn remaining_time(&self) -> usize {
        self.remaining_time
    }

    pub fn service_time(&self) -> usize {
        self.service_time
    }

    pub fn remaining_io(&self) -> usize {
        self.remaining_io
    }

    pub fn in_io(&self) -> bool {
        self.state == ProcessState::Blocked
    }

    pub fn wait_time(&self) -> usize {
        self.wait_time
    }

    pub fn last_run_time(&self) -> Timestamp {
        self.last_run_time
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    pub fn completion_time(&self) -> Option<Timestamp> {
        self.completion_time
    }

    pub fn io_count(&self) -> usize {
        self.io_count
    }

    pub fn is_completed(&self) -> bool {
        self.state == ProcessState::Completed
    }

    fn violation(&self, operation: &str) -> SchedulerError {
        SchedulerError::invariant(
            &self.pid,
            format!("{} is not allowed in state {:?}", operation, self.state),
        )
    }

    fn ready_level(&self, operation: &str) -> Result<Level, SchedulerError> {
        match self.state {
            ProcessState::Ready { level } => Ok(level),
            _ => Err(self.violation(operation)),
        }
    }

    fn running_level(&self, operation: &str) -> Result<Level, SchedulerError> {
        match self.state {
            ProcessState::Running { level } => Ok(level),
            _ => Err(self.violation(operation)),
        }
    }

    fn enter_level(&mut self, level: Level, now: Timestamp) {
        self.current_priority = level.priority();
        self.last_run_time = now;
        self.state = ProcessState::Ready { level };
    }

    /// Moves a newly arrived process to the ready level of its original
    /// priority and returns that level
    ///
    /// Aging measures waiting from the arrival tick, even when the
    /// scheduler only notices the arrival later.
    pub fn arrive(&mut self) -> Result<Level, SchedulerError> {
        if self.state != ProcessState::NotArrived {
            return Err(self.violation("arrive"));
        }

        let level = self.original_level();
        self.enter_level(level, self.arrival_time);
        Ok(level)
    }

    /// Hands the CPU to the process; the first dispatch sets `start_time`
    pub fn dispatch(&mut self, now: Timestamp) -> Result<Level, SchedulerError> {
        let level = self.ready_level("dispatch")?;

        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
        self.last_run_time = now;
        self.state = ProcessState::Running { level };
        Ok(level)
    }

    /// Consumes `exec_time` units of CPU
    pub fn run(&mut self, exec_time: usize) -> Result<(), SchedulerError> {
        self.running_level("run")?;

        if exec_time == 0 || exec_time > self.remaining_time {
            return Err(SchedulerError::invariant(
                &self.pid,
                format!(
                    "cannot run for {} with {} remaining",
                    exec_time, self.remaining_time
                ),
            ));
        }

        self.remaining_time -= exec_time;
        self.service_time += exec_time;
        Ok(())
    }

    /// Whether the service just consumed crossed the next I/O boundary
    ///
    /// The burst is split into `io_portions` equal portions (rounded up)
    /// and one I/O episode separates two consecutive portions, so a
    /// process requests at most `io_portions - 1` I/Os over its life.
    pub fn io_due(&self, io_portions: usize) -> bool {
        if self.io_burst == 0 || self.remaining_time == 0 {
            return false;
        }
        if self.io_count + 1 >= io_portions {
            return false;
        }

        let boundary = (self.burst_time * (self.io_count + 1)).div_ceil(io_portions);
        self.service_time >= boundary
    }

    /// Leaves the CPU for an I/O episode of `io_burst` units
    pub fn block_for_io(&mut self) -> Result<(), SchedulerError> {
        self.running_level("block_for_io")?;

        if self.remaining_time == 0 || self.io_burst == 0 {
            return Err(self.violation("block_for_io"));
        }

        self.remaining_io = self.io_burst;
        self.io_count += 1;
        self.state = ProcessState::Blocked;
        Ok(())
    }

    /// Counts down the pending I/O by `elapsed` units
    pub fn advance_io(&mut self, elapsed: usize) -> Result<(), SchedulerError> {
        if self.state != ProcessState::Blocked {
            return Err(self.violation("advance_io"));
        }

        self.remaining_io = self.remaining_io.saturating_sub(elapsed);
        Ok(())
    }

    /// Returns a process whose I/O finished to its original level
    ///
    /// I/O-bound work does not inherit the demotions it collected while
    /// running on the CPU.
    pub fn unblock_from_io(&mut self, now: Timestamp) -> Result<Level, SchedulerError> {
        if self.state != ProcessState::Blocked || self.remaining_io != 0 {
            return Err(self.violation("unblock_from_io"));
        }

        let level = self.original_level();
        self.enter_level(level, now);
        Ok(level)
    }

    /// Promotes a waiting process one level up
    ///
    /// * `levels` - number of levels in the queue set
    pub fn age_promote(&mut self, now: Timestamp, levels: usize) -> Result<Level, SchedulerError> {
        let level = self.ready_level("age_promote")?;

        let target = level.higher();
        if target.index() >= levels {
            return Err(self.violation("age_promote from the top level"));
        }

        self.enter_level(target, now);
        Ok(target)
    }

    /// Takes the CPU back after a full quantum and moves the process one
    /// level down; at level 0 it stays where it is
    pub fn demote(&mut self, now: Timestamp) -> Result<Level, SchedulerError> {
        let level = self.running_level("demote")?;

        if self.remaining_time == 0 {
            return Err(self.violation("demote with no remaining time"));
        }

        let target = level.lower().unwrap_or(level);
        self.enter_level(target, now);
        Ok(target)
    }

    /// Takes the CPU back and keeps the process on its current level
    pub fn requeue(&mut self, now: Timestamp) -> Result<Level, SchedulerError> {
        let level = self.running_level("requeue")?;

        if self.remaining_time == 0 {
            return Err(self.violation("requeue with no remaining time"));
        }

        self.enter_level(level, now);
        Ok(level)
    }

    /// Marks the process finished; requires the whole burst consumed
    pub fn complete(&mut self, now: Timestamp) -> Result<(), SchedulerError> {
        self.running_level("complete")?;

        if self.remaining_time != 0 || self.completion_time.is_some() {
            return Err(self.violation("complete with work left"));
        }

        self.completion_time = Some(now);
        self.state = ProcessState::Completed;
        Ok(())
    }

    /// Accounts `time` units spent in a ready queue behind another process
    pub fn add_wait(&mut self, time: usize) -> Result<(), SchedulerError> {
        self.ready_level("add_wait")?;
        self.wait_time += time;
        Ok(())
    }

    /// Restores every mutable field to its construction value
    pub fn reset(&mut self) {
        self.current_priority = self.original_priority;
        self.remaining_time = self.burst_time;
        self.service_time = 0;
        self.remaining_io = 0;
        self.wait_time = 0;
        self.last_run_time = Timestamp::default();
        self.start_time = None;
        self.completion_time = None;
        self.io_count = 0;
        self.state = ProcessState::NotArrived;
    }
}

impl From<&ProcessSpec> for ProcessControlBlock {
    fn from(spec: &ProcessSpec) -> Self {
        ProcessControlBlock::new(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcb(burst: usize, io: usize, priority: usize) -> ProcessControlBlock {
        ProcessControlBlock::new(&ProcessSpec::new("P", 0, burst, io, priority))
    }

    fn t(time: usize) -> Timestamp {
        Timestamp::new(time)
    }

    #[test]
    fn lifecycle_runs_to_completion() {
        let mut p = pcb(5, 0, 2);

        assert_eq!(p.arrive().unwrap(), Level::new(1));
        assert_eq!(p.dispatch(t(1)).unwrap(), Level::new(1));
        assert_eq!(p.start_time(), Some(t(1)));

        p.run(3).unwrap();
        assert_eq!(p.demote(t(4)).unwrap(), Level::new(0));
        assert_eq!(p.current_priority(), 1);
        assert_eq!(p.last_run_time(), t(4));

        p.dispatch(t(6)).unwrap();
        assert_eq!(p.start_time(), Some(t(1)));
        p.run(2).unwrap();
        p.complete(t(8)).unwrap();

        assert_eq!(p.completion_time(), Some(t(8)));
        assert_eq!(p.service_time(), 5);
        assert!(p.is_completed());
    }

    #[test]
    fn completed_process_rejects_further_operations() {
        let mut p = pcb(1, 0, 1);
        p.arrive().unwrap();
        p.dispatch(t(0)).unwrap();
        p.run(1).unwrap();
        p.complete(t(1)).unwrap();

        assert!(p.dispatch(t(2)).is_err());
        assert!(p.block_for_io().is_err());
        assert!(p.complete(t(3)).is_err());
        assert!(p.add_wait(1).is_err());
        assert_eq!(p.completion_time(), Some(t(1)));
    }

    #[test]
    fn complete_requires_no_remaining_time() {
        let mut p = pcb(4, 0, 1);
        p.arrive().unwrap();
        p.dispatch(t(0)).unwrap();
        p.run(2).unwrap();
        assert!(matches!(
            p.complete(t(2)),
            Err(SchedulerError::InvariantViolation { .. })
        ));
        assert!(p.run(3).is_err());
    }

    #[test]
    fn demote_at_lowest_level_stays() {
        let mut p = pcb(4, 0, 1);
        p.arrive().unwrap();
        p.dispatch(t(0)).unwrap();
        p.run(2).unwrap();
        assert_eq!(p.demote(t(2)).unwrap(), Level::new(0));
        assert_eq!(p.state(), ProcessState::Ready { level: Level::new(0) });
    }

    #[test]
    fn io_returns_to_original_level() {
        let mut p = pcb(10, 3, 3);
        p.arrive().unwrap();
        p.dispatch(t(0)).unwrap();
        p.run(4).unwrap();
        p.demote(t(4)).unwrap();
        p.dispatch(t(4)).unwrap();
        p.run(1).unwrap();
        assert!(p.io_due(2));

        p.block_for_io().unwrap();
        assert!(p.in_io());
        assert_eq!(p.remaining_io(), 3);
        assert_eq!(p.io_count(), 1);
        assert!(p.unblock_from_io(t(6)).is_err());

        p.advance_io(5).unwrap();
        assert_eq!(p.remaining_io(), 0);
        assert_eq!(p.unblock_from_io(t(8)).unwrap(), Level::new(2));
        assert_eq!(p.current_priority(), 3);
        assert!(!p.in_io());
    }

    #[test]
    fn io_boundaries_split_the_burst() {
        let mut p = pcb(12, 2, 1);
        p.arrive().unwrap();
        p.dispatch(t(0)).unwrap();
        p.run(5).unwrap();
        assert!(!p.io_due(2));
        p.run(1).unwrap();
        assert!(p.io_due(2));
        assert!(!p.io_due(1));

        p.block_for_io().unwrap();
        p.advance_io(2).unwrap();
        p.unblock_from_io(t(8)).unwrap();
        p.dispatch(t(8)).unwrap();
        p.run(5).unwrap();
        assert!(!p.io_due(2));
    }

    #[test]
    fn cpu_only_process_never_blocks() {
        let mut p = pcb(4, 0, 1);
        p.arrive().unwrap();
        p.dispatch(t(0)).unwrap();
        p.run(2).unwrap();
        assert!(!p.io_due(2));
        assert!(p.block_for_io().is_err());
    }

    #[test]
    fn age_promote_stops_below_top() {
        let mut p = pcb(4, 0, 1);
        p.arrive().unwrap();
        assert_eq!(p.age_promote(t(5), 2).unwrap(), Level::new(1));
        assert_eq!(p.last_run_time(), t(5));
        assert!(p.age_promote(t(9), 2).is_err());
    }

    #[test]
    fn reset_restores_construction_state() {
        let fresh = pcb(6, 2, 2);
        let mut p = fresh.clone();
        p.arrive().unwrap();
        p.add_wait(2).unwrap();
        p.dispatch(t(3)).unwrap();
        p.run(3).unwrap();
        p.block_for_io().unwrap();

        p.reset();
        assert_eq!(format!("{:?}", p), format!("{:?}", fresh));
        p.reset();
        assert_eq!(format!("{:?}", p), format!("{:?}", fresh));
    }
}
