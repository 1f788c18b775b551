use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::Pid;

pub const DEFAULT_LEVEL_QUANTA: [usize; 3] = [2, 4, 8];
pub const DEFAULT_AGING_THRESHOLD: usize = 10;
pub const DEFAULT_TIME_CEILING: usize = 50;
pub const DEFAULT_IO_PORTIONS: usize = 2;

/// Parameters of a multilevel feedback queue run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlfqConfig {
    /// Time quantum of every level, lowest level first
    ///
    /// The number of levels is the length of this list. Quanta must
    /// strictly increase with the level index.
    pub level_quanta: Vec<usize>,
    /// Ticks a ready process may wait below the top level before it is
    /// promoted one level up
    pub aging_threshold: usize,
    /// The run stops once the clock reaches this tick
    pub time_ceiling: usize,
    /// Number of equal CPU portions a process with I/O splits its burst
    /// into; one I/O request separates two consecutive portions
    pub io_portions: usize,
}

impl Default for MlfqConfig {
    fn default() -> Self {
        MlfqConfig {
            level_quanta: DEFAULT_LEVEL_QUANTA.to_vec(),
            aging_threshold: DEFAULT_AGING_THRESHOLD,
            time_ceiling: DEFAULT_TIME_CEILING,
            io_portions: DEFAULT_IO_PORTIONS,
        }
    }
}

impl MlfqConfig {
    pub fn levels(&self) -> usize {
        self.level_quanta.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level_quanta.is_empty() {
            return Err(ConfigError::NoLevels);
        }

        let mut previous: Option<usize> = None;
        for (level, &quantum) in self.level_quanta.iter().enumerate() {
            if quantum == 0 {
                return Err(ConfigError::ZeroQuantum { level: level + 1 });
            }
            if let Some(previous) = previous {
                if quantum <= previous {
                    return Err(ConfigError::QuantaNotIncreasing {
                        level: level + 1,
                        quantum,
                        previous,
                    });
                }
            }
            previous = Some(quantum);
        }

        if self.aging_threshold == 0 {
            return Err(ConfigError::ZeroAgingThreshold);
        }
        if self.time_ceiling == 0 {
            return Err(ConfigError::ZeroTimeCeiling);
        }
        if self.io_portions == 0 {
            return Err(ConfigError::ZeroIoPortions);
        }

        Ok(())
    }

    /// Checks that the quanta list describes exactly `levels` levels
    pub fn expect_levels(&self, levels: usize) -> Result<(), ConfigError> {
        if self.levels() != levels {
            return Err(ConfigError::QuantaLength {
                expected: levels,
                got: self.levels(),
            });
        }
        Ok(())
    }
}

/// One process as described by the workload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub pid: Pid,
    #[serde(default)]
    pub arrival_time: usize,
    pub burst_time: usize,
    #[serde(default)]
    pub io_burst: usize,
    /// 1 is the lowest priority
    #[serde(default = "default_priority")]
    pub priority: usize,
}

fn default_priority() -> usize {
    1
}

impl ProcessSpec {
    pub fn new(
        pid: impl Into<Pid>,
        arrival_time: usize,
        burst_time: usize,
        io_burst: usize,
        priority: usize,
    ) -> ProcessSpec {
        ProcessSpec {
            pid: pid.into(),
            arrival_time,
            burst_time,
            io_burst,
            priority,
        }
    }
}

/// Checks process descriptions against a queue set of `levels` levels
///
/// Baseline schedulers have no levels and pass `None`, which skips the
/// priority range check.
pub fn validate_processes(specs: &[ProcessSpec], levels: Option<usize>) -> Result<(), ConfigError> {
    let mut seen: HashSet<&Pid> = HashSet::new();

    for spec in specs {
        if !seen.insert(&spec.pid) {
            return Err(ConfigError::DuplicatePid {
                pid: spec.pid.clone(),
            });
        }
        if spec.burst_time == 0 {
            return Err(ConfigError::ZeroBurst {
                pid: spec.pid.clone(),
            });
        }
        if let Some(levels) = levels {
            if spec.priority == 0 || spec.priority > levels {
                return Err(ConfigError::PriorityOutOfRange {
                    pid: spec.pid.clone(),
                    priority: spec.priority,
                    levels,
                });
            }
        }
    }

    Ok(())
}

/// A complete simulation input: configuration plus the process list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    #[serde(default)]
    pub config: MlfqConfig,
    pub processes: Vec<ProcessSpec>,
}

impl Workload {
    pub fn parse(input: &str) -> serde_json::Result<Workload> {
        serde_json::from_str(input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()?;
        validate_processes(&self.processes, Some(self.config.levels()))
    }

    /// The five-process workload the simulator was first written around
    pub fn sample() -> Workload {
        Workload {
            config: MlfqConfig::default(),
            processes: vec![
                ProcessSpec::new("P1", 0, 12, 3, 2),
                ProcessSpec::new("P2", 1, 8, 2, 1),
                ProcessSpec::new("P3", 2, 15, 4, 3),
                ProcessSpec::new("P4", 3, 6, 1, 1),
                ProcessSpec::new("P5", 4, 10, 3, 2),
            ],
        }
    }
}
