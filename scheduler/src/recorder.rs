//! Append-only outputs of a run: the execution timeline and the
//! queue-change log.

use std::fmt;

use serde::Serialize;

use crate::{Level, Pid, SchedulerError, Timestamp};

/// One contiguous stretch of CPU time given to a process
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub pid: Pid,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Segment {
    pub fn duration(&self) -> usize {
        self.end.since(self.start)
    }
}

/// Execution segments in chronological order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline(Vec<Segment>);

impl Timeline {
    pub fn new() -> Timeline {
        Timeline(Vec::new())
    }

    /// Appends a segment; segments must be non-empty and may not start
    /// before the previous one ended
    pub fn record(&mut self, pid: &Pid, start: Timestamp, end: Timestamp) -> Result<(), SchedulerError> {
        if start >= end {
            return Err(SchedulerError::invariant(
                pid,
                format!("empty segment {}..{}", start, end),
            ));
        }
        if let Some(last) = self.0.last() {
            if start < last.end {
                return Err(SchedulerError::invariant(
                    pid,
                    format!("segment starting at {} overlaps {}..{}", start, last.start, last.end),
                ));
            }
        }

        self.0.push(Segment {
            pid: pid.clone(),
            start,
            end,
        });
        Ok(())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_pid<'a>(&'a self, pid: &'a Pid) -> impl Iterator<Item = &'a Segment> + 'a {
        self.0.iter().filter(move |segment| &segment.pid == pid)
    }

    /// Total CPU time the timeline gives to `pid`
    pub fn busy_time(&self, pid: &Pid) -> usize {
        self.for_pid(pid).map(Segment::duration).sum()
    }

    /// Tick at which the last segment ends
    pub fn end(&self) -> Option<Timestamp> {
        self.0.last().map(|segment| segment.end)
    }
}

/// What happened at a log entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LogAction {
    #[serde(rename = "Arrival")]
    Arrival,
    #[serde(rename = "IO Complete, Requeue")]
    IoCompleteRequeue,
    #[serde(rename = "Aging Promotion")]
    AgingPromotion,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "IO Blocked")]
    IoBlocked,
    #[serde(rename = "Quantum Exceeded, Degradation")]
    QuantumExceededDegradation,
    #[serde(rename = "Quantum Exceeded, Requeue L1")]
    QuantumExceededRequeue,
    #[serde(rename = "Idle Time End")]
    IdleTimeEnd,
    #[serde(rename = "IO Time Advance")]
    IoTimeAdvance,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Arrival => "Arrival",
            LogAction::IoCompleteRequeue => "IO Complete, Requeue",
            LogAction::AgingPromotion => "Aging Promotion",
            LogAction::Completed => "Completed",
            LogAction::IoBlocked => "IO Blocked",
            LogAction::QuantumExceededDegradation => "Quantum Exceeded, Degradation",
            LogAction::QuantumExceededRequeue => "Quantum Exceeded, Requeue L1",
            LogAction::IdleTimeEnd => "Idle Time End",
            LogAction::IoTimeAdvance => "IO Time Advance",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered contents of one queue level at a point in time
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelSnapshot {
    pub level: Level,
    pub pids: Vec<Pid>,
}

/// A state change of the scheduler together with a copy of every queue
/// and of the I/O pool, taken right after the change was applied
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub time: Timestamp,
    pub action: LogAction,
    pub pid: Option<Pid>,
    pub from_level: Option<Level>,
    pub to_level: Option<Level>,
    /// Lowest level first
    pub queues: Vec<LevelSnapshot>,
    /// Insertion order
    pub io_pool: Vec<Pid>,
}

impl LogEntry {
    pub fn queue(&self, level: Level) -> Option<&[Pid]> {
        self.queues
            .iter()
            .find(|snapshot| snapshot.level == level)
            .map(|snapshot| snapshot.pids.as_slice())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RunLog(Vec<LogEntry>);

impl RunLog {
    pub fn new() -> RunLog {
        RunLog(Vec::new())
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.0.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn with_action(&self, action: LogAction) -> impl Iterator<Item = &LogEntry> {
        self.0.iter().filter(move |entry| entry.action == action)
    }
}
