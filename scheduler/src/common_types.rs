use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A point on the simulation's logical clock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(usize);

impl Timestamp {
    /// Creates a new Timestamp object
    ///
    /// * `time` - initial value of the Timestamp
    pub fn new(time: usize) -> Timestamp {
        Timestamp(time)
    }

    pub fn get(&self) -> usize {
        self.0
    }

    /// Units of time elapsed since `earlier`, zero if `earlier` is in the future
    pub fn since(&self, earlier: Timestamp) -> usize {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<usize> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: usize) -> Self::Output {
        Timestamp::new(self.0 + rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user-facing identifier of a process, e.g. `P1`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(String);

impl Pid {
    pub fn new(pid: impl Into<String>) -> Pid {
        Pid(pid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pid {
    fn from(pid: &str) -> Self {
        Pid::new(pid)
    }
}

/// A queue level, 0-indexed
///
/// Level `0` is the lowest priority. A process of priority `p` (1-based,
/// as given in the workload) lives at level `p - 1`. Levels are displayed
/// 1-based (`L1`, `L2`, ...) to match the priorities users write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(usize);

impl Level {
    pub fn new(index: usize) -> Level {
        Level(index)
    }

    /// The level a 1-based priority maps to
    ///
    /// * `priority` - must be at least 1, which callers validate up front
    pub fn from_priority(priority: usize) -> Level {
        Level(priority.saturating_sub(1))
    }

    pub fn index(&self) -> usize {
        self.0
    }

    pub fn priority(&self) -> usize {
        self.0 + 1
    }

    pub fn is_lowest(&self) -> bool {
        self.0 == 0
    }

    /// The next lower level, or `None` at level 0
    pub fn lower(&self) -> Option<Level> {
        self.0.checked_sub(1).map(Level)
    }

    pub fn higher(&self) -> Level {
        Level(self.0 + 1)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0 + 1)
    }
}
