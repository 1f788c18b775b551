use log::{debug, info, trace, warn};

use crate::collector::{check_partition, Collector};
use crate::config::validate_processes;
use crate::recorder::{LogAction, LogEntry, RunLog, Timeline};
use crate::schedulers::{IoPool, QueueSet};
use crate::scheduler_info::SchedulerInfo;
use crate::{
    Level, MlfqConfig, ProcessControlBlock, ProcessSpec, ProcessState, Schedule, Scheduler,
    SchedulerError,
};

/// Multilevel feedback queue scheduler
///
/// Level `L-1` is dispatched first. A process that uses up its quantum is
/// degraded one level, a process that waited `aging_threshold` ticks below
/// the top is promoted one level, and a process coming back from I/O
/// returns to the level of its original priority.
pub struct MlfqScheduler {
    config: MlfqConfig,
}

impl MlfqScheduler {
    pub fn new(config: MlfqConfig) -> Result<MlfqScheduler, SchedulerError> {
        config.validate()?;
        Ok(MlfqScheduler { config })
    }

    /// Like `new`, also checking that the quanta describe `levels` levels
    pub fn with_levels(levels: usize, config: MlfqConfig) -> Result<MlfqScheduler, SchedulerError> {
        config.expect_levels(levels)?;
        MlfqScheduler::new(config)
    }

    pub fn config(&self) -> &MlfqConfig {
        &self.config
    }
}

impl Scheduler for MlfqScheduler {
    fn name(&self) -> &'static str {
        "mlfq"
    }

    fn schedule(&mut self, processes: &mut [ProcessControlBlock]) -> Result<Schedule, SchedulerError> {
        let specs: Vec<ProcessSpec> = processes.iter().map(ProcessControlBlock::spec).collect();
        validate_processes(&specs, Some(self.config.levels()))?;

        for pcb in processes.iter_mut() {
            pcb.reset();
        }

        MlfqRun::new(&self.config, processes).run()
    }
}

/// State of a single run; dropped once the outputs are handed back
struct MlfqRun<'a> {
    info: SchedulerInfo<'a>,
    /// Every process of the run, indexed by the values the queues hold
    arena: &'a mut [ProcessControlBlock],
    queues: QueueSet,
    io_pool: IoPool,
    running: Option<usize>,
    timeline: Timeline,
    log: RunLog,
}

impl<'a> MlfqRun<'a> {
    fn new(config: &'a MlfqConfig, arena: &'a mut [ProcessControlBlock]) -> MlfqRun<'a> {
        MlfqRun {
            info: SchedulerInfo::new(config, arena),
            arena,
            queues: QueueSet::new(&config.level_quanta),
            io_pool: IoPool::new(),
            running: None,
            timeline: Timeline::new(),
            log: RunLog::new(),
        }
    }

    fn has_work(&self) -> bool {
        self.info.has_pending_arrivals() || !self.queues.is_empty() || !self.io_pool.is_empty()
    }

    fn run(mut self) -> Result<Schedule, SchedulerError> {
        let config = self.info.config();
        info!(
            "mlfq: {} processes, quanta {:?}, aging threshold {}, ceiling {}",
            self.arena.len(),
            config.level_quanta,
            config.aging_threshold,
            config.time_ceiling
        );

        while !self.info.reached_ceiling() && self.has_work() {
            self.admit_arrivals()?;
            self.complete_io()?;
            self.age_waiting()?;

            match self.queues.dequeue_highest_nonempty() {
                Some((level, proc)) => self.execute(level, proc)?,
                None => {
                    if !self.skip_idle()? {
                        break;
                    }
                }
            }

            check_partition(&self)?;
        }

        let finished_at = self.info.get_timestamp();
        let truncated = self.has_work();
        if truncated {
            warn!(
                "mlfq: time ceiling {} reached with {} processes unfinished",
                config.time_ceiling,
                self.arena.iter().filter(|pcb| !pcb.is_completed()).count()
            );
        }
        info!(
            "mlfq: stopped at {} after {} segments and {} log entries",
            finished_at,
            self.timeline.len(),
            self.log.len()
        );

        Ok(Schedule {
            timeline: self.timeline,
            log: self.log,
            finished_at,
            truncated,
        })
    }

    /// Appends a log entry with a copy of the queues and the I/O pool as
    /// they are right now
    fn record(
        &mut self,
        action: LogAction,
        proc: Option<usize>,
        from_level: Option<Level>,
        to_level: Option<Level>,
    ) {
        let entry = LogEntry {
            time: self.info.get_timestamp(),
            action,
            pid: proc.map(|proc| self.arena[proc].pid().clone()),
            from_level,
            to_level,
            queues: self.queues.snapshot(self.arena),
            io_pool: self.io_pool.snapshot(self.arena),
        };
        self.log.push(entry);
    }

    fn admit_arrivals(&mut self) -> Result<(), SchedulerError> {
        while let Some(proc) = self.info.pop_due_arrival(self.arena) {
            let level = self.arena[proc].arrive()?;
            self.queues.enqueue(level, proc, false);

            debug!(
                "t={} {} arrives at {}",
                self.info.get_timestamp(),
                self.arena[proc].pid(),
                level
            );
            self.record(LogAction::Arrival, Some(proc), None, Some(level));
        }
        Ok(())
    }

    fn complete_io(&mut self) -> Result<(), SchedulerError> {
        let now = self.info.get_timestamp();

        for proc in self.io_pool.finished(self.arena) {
            self.io_pool.remove(proc);
            let level = self.arena[proc].unblock_from_io(now)?;
            self.queues.enqueue(level, proc, false);

            debug!("t={} {} back from I/O to {}", now, self.arena[proc].pid(), level);
            self.record(LogAction::IoCompleteRequeue, Some(proc), None, Some(level));
        }
        Ok(())
    }

    /// Promotes every process that waited long enough below the top level
    ///
    /// Candidates are chosen before anything moves, so a process climbs at
    /// most one level per tick.
    fn age_waiting(&mut self) -> Result<(), SchedulerError> {
        let now = self.info.get_timestamp();
        let threshold = self.info.config().aging_threshold;
        let top = self.queues.top();

        let mut candidates: Vec<(Level, usize)> = Vec::new();
        for index in 0..top.index() {
            let level = Level::new(index);
            for proc in self.queues.level(level) {
                if now.since(self.arena[proc].last_run_time()) >= threshold {
                    candidates.push((level, proc));
                }
            }
        }

        for (level, proc) in candidates {
            if !self.queues.remove(level, proc) {
                return Err(SchedulerError::invariant(
                    self.arena[proc].pid(),
                    format!("aging candidate missing from {}", level),
                ));
            }

            let target = self.arena[proc].age_promote(now, self.queues.levels())?;
            self.queues.enqueue(target, proc, true);

            debug!("t={} {} aged {} -> {}", now, self.arena[proc].pid(), level, target);
            self.record(LogAction::AgingPromotion, Some(proc), Some(level), Some(target));
        }
        Ok(())
    }

    /// Runs `proc` for one slice of its level's quantum and decides where
    /// it goes next
    fn execute(&mut self, level: Level, proc: usize) -> Result<(), SchedulerError> {
        let start = self.info.get_timestamp();

        let dispatched = self.arena[proc].dispatch(start)?;
        if dispatched != level {
            return Err(SchedulerError::invariant(
                self.arena[proc].pid(),
                format!("dequeued from {} but recorded at {}", level, dispatched),
            ));
        }
        self.running = Some(proc);

        let exec_time = self.queues.quantum(level).min(self.arena[proc].remaining_time());
        self.arena[proc].run(exec_time)?;
        self.timeline
            .record(self.arena[proc].pid(), start, start + exec_time)?;
        self.info.make_timeskip(exec_time);
        trace!(
            "t={} {} ran {} on {}, {} left",
            start,
            self.arena[proc].pid(),
            exec_time,
            level,
            self.arena[proc].remaining_time()
        );

        for waiting in self.queues.iter() {
            self.arena[waiting].add_wait(exec_time)?;
        }
        self.io_pool.advance(self.arena, exec_time)?;

        let now = self.info.get_timestamp();
        let pcb = &mut self.arena[proc];
        self.running = None;

        if pcb.remaining_time() == 0 {
            pcb.complete(now)?;
            debug!("t={} {} completed", now, pcb.pid());
            self.record(LogAction::Completed, Some(proc), Some(level), None);
        } else if pcb.io_due(self.info.config().io_portions) {
            pcb.block_for_io()?;
            debug!("t={} {} blocks on I/O for {}", now, pcb.pid(), pcb.remaining_io());
            self.io_pool.insert(proc);
            self.record(LogAction::IoBlocked, Some(proc), Some(level), None);
        } else {
            let target = pcb.demote(now)?;
            let action = if level.is_lowest() {
                debug!("t={} {} requeued on {}", now, pcb.pid(), level);
                LogAction::QuantumExceededRequeue
            } else {
                debug!("t={} {} degraded {} -> {}", now, pcb.pid(), level, target);
                LogAction::QuantumExceededDegradation
            };
            self.queues.enqueue(target, proc, false);
            self.record(action, Some(proc), Some(level), Some(target));
        }

        Ok(())
    }

    /// Moves the clock over a stretch with nothing ready to run
    ///
    /// Returns false when there is nothing left to wait for.
    fn skip_idle(&mut self) -> Result<bool, SchedulerError> {
        let now = self.info.get_timestamp();

        if let Some(proc) = self.info.peek_arrival() {
            let jump = self.arena[proc].arrival_time().since(now);
            self.info.make_timeskip(jump);
            self.io_pool.advance(self.arena, jump)?;

            debug!("t={} idle until {}", now, self.info.get_timestamp());
            self.record(LogAction::IdleTimeEnd, None, None, None);
            return Ok(true);
        }

        if let Some((proc, remaining)) = self.io_pool.soonest_completion(self.arena) {
            if remaining == 0 {
                return Err(SchedulerError::invariant(
                    self.arena[proc].pid(),
                    "finished I/O was not requeued",
                ));
            }

            self.info.make_timeskip(remaining);
            self.io_pool.advance(self.arena, remaining)?;

            debug!("t={} idle on I/O until {}", now, self.info.get_timestamp());
            self.record(LogAction::IoTimeAdvance, None, None, None);
            return Ok(true);
        }

        Ok(false)
    }
}

impl Collector for MlfqRun<'_> {
    fn processes(&self) -> &[ProcessControlBlock] {
        self.arena
    }

    fn collect_pending(&self) -> Vec<usize> {
        self.info.pending().to_vec()
    }

    fn collect_ready(&self) -> Vec<usize> {
        self.queues.iter().collect()
    }

    fn collect_running(&self) -> Vec<usize> {
        self.running.into_iter().collect()
    }

    fn collect_blocked(&self) -> Vec<usize> {
        self.io_pool.iter().collect()
    }

    fn collect_completed(&self) -> Vec<usize> {
        self.arena
            .iter()
            .enumerate()
            .filter(|(_, pcb)| pcb.state() == ProcessState::Completed)
            .map(|(proc, _)| proc)
            .collect()
    }
}
