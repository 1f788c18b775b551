use std::collections::VecDeque;

use crate::recorder::LevelSnapshot;
use crate::{Level, ProcessControlBlock};

/// The ready queues of the feedback scheduler, one per level
///
/// Queues hold arena indices, never process records, so a process can be
/// referenced from at most one place at a time.
pub struct QueueSet {
    /// Ready queues, lowest level first
    levels: Vec<VecDeque<usize>>,
    /// Time quantum of each level
    quanta: Vec<usize>,
}

impl QueueSet {
    /// Creates one empty queue per quantum
    ///
    /// * `quanta` - the time quantum of every level, lowest level first
    pub fn new(quanta: &[usize]) -> QueueSet {
        QueueSet {
            levels: quanta.iter().map(|_| VecDeque::new()).collect(),
            quanta: quanta.to_vec(),
        }
    }

    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    pub fn top(&self) -> Level {
        Level::new(self.levels.len().saturating_sub(1))
    }

    pub fn quantum(&self, level: Level) -> usize {
        self.quanta[level.index()]
    }

    /// Appends `proc` to the tail of `level`, or to its head when `front`
    /// is set (aging promotions jump the local queue)
    pub fn enqueue(&mut self, level: Level, proc: usize, front: bool) {
        let queue = &mut self.levels[level.index()];
        if front {
            queue.push_front(proc);
        } else {
            queue.push_back(proc);
        }
    }

    /// Pops the head of the highest non-empty level
    pub fn dequeue_highest_nonempty(&mut self) -> Option<(Level, usize)> {
        for index in (0..self.levels.len()).rev() {
            if let Some(proc) = self.levels[index].pop_front() {
                return Some((Level::new(index), proc));
            }
        }
        None
    }

    pub fn contains(&self, level: Level, proc: usize) -> bool {
        self.levels[level.index()].contains(&proc)
    }

    /// Removes `proc` from `level`, returns whether it was there
    pub fn remove(&mut self, level: Level, proc: usize) -> bool {
        let queue = &mut self.levels[level.index()];
        match queue.iter().position(|&queued| queued == proc) {
            Some(position) => {
                queue.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn level(&self, level: Level) -> impl Iterator<Item = usize> + '_ {
        self.levels[level.index()].iter().copied()
    }

    /// Every queued process, lowest level first
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.levels.iter().flat_map(|queue| queue.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.levels.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(VecDeque::is_empty)
    }

    pub fn snapshot(&self, arena: &[ProcessControlBlock]) -> Vec<LevelSnapshot> {
        self.levels
            .iter()
            .enumerate()
            .map(|(index, queue)| LevelSnapshot {
                level: Level::new(index),
                pids: queue.iter().map(|&proc| arena[proc].pid().clone()).collect(),
            })
            .collect()
    }
}
