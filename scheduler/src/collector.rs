use crate::{Pid, ProcessControlBlock, ProcessState, SchedulerError};

/// Read-only view of where every process of a run currently is
///
/// Every method returns arena indices.
pub trait Collector {
    fn processes(&self) -> &[ProcessControlBlock];

    // Processes that have not arrived yet
    fn collect_pending(&self) -> Vec<usize>;

    // Processes sitting in a ready queue
    fn collect_ready(&self) -> Vec<usize>;

    // The process on the CPU, if any
    fn collect_running(&self) -> Vec<usize>;

    // Processes blocked on I/O
    fn collect_blocked(&self) -> Vec<usize>;

    // Returns a list of finished processes
    fn collect_completed(&self) -> Vec<usize>;
}

pub fn collect_all(scheduler: &dyn Collector) -> Vec<usize> {
    let mut procs: Vec<usize> = Vec::new();

    procs.extend(scheduler.collect_pending());
    procs.extend(scheduler.collect_ready());
    procs.extend(scheduler.collect_running());
    procs.extend(scheduler.collect_blocked());
    procs.extend(scheduler.collect_completed());

    procs
}

/// Checks that every process is in exactly one place and that the place
/// agrees with the state recorded in the process
pub fn check_partition(scheduler: &dyn Collector) -> Result<(), SchedulerError> {
    let arena = scheduler.processes();
    let mut seen = vec![false; arena.len()];

    for proc in collect_all(scheduler) {
        let pid = arena
            .get(proc)
            .map(|pcb| pcb.pid().clone())
            .unwrap_or_else(|| Pid::new(format!("#{}", proc)));

        match seen.get_mut(proc) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => return Err(SchedulerError::invariant(&pid, "tracked in two places")),
            None => return Err(SchedulerError::invariant(&pid, "not in the process arena")),
        }
    }

    if let Some(missing) = seen.iter().position(|&slot| !slot) {
        return Err(SchedulerError::invariant(arena[missing].pid(), "lost track of process"));
    }

    let places: [(Vec<usize>, fn(ProcessState) -> bool); 5] = [
        (scheduler.collect_pending(), |state| state == ProcessState::NotArrived),
        (scheduler.collect_ready(), |state| matches!(state, ProcessState::Ready { .. })),
        (scheduler.collect_running(), |state| matches!(state, ProcessState::Running { .. })),
        (scheduler.collect_blocked(), |state| state == ProcessState::Blocked),
        (scheduler.collect_completed(), |state| state == ProcessState::Completed),
    ];
    for (procs, expected) in places.iter() {
        for &proc in procs {
            let pcb = &arena[proc];
            if !expected(pcb.state()) {
                return Err(SchedulerError::invariant(
                    pcb.pid(),
                    format!("recorded state {:?} disagrees with its queue", pcb.state()),
                ));
            }
        }
    }

    for proc in scheduler.collect_ready() {
        let pcb = &arena[proc];
        if let ProcessState::Ready { level } = pcb.state() {
            if level != pcb.current_level() {
                return Err(SchedulerError::invariant(
                    pcb.pid(),
                    format!("queued on {} with priority {}", level, pcb.current_priority()),
                ));
            }
        }
    }

    Ok(())
}
