use crate::error::Error;
use rand::Rng;
use std::fmt;
use std::time::Duration;

pub const STANDARD_INTERVAL_MS: u64 = 1000;
pub const AGGRESSIVE_INTERVAL_MS: u64 = 200;
/// Half-open range of the intermittent draw.
pub const INTERMITTENT_INTERVAL_MS: std::ops::Range<u64> = 500..3000;

/// Experiment mode, selecting how long to wait between probes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExperimentMode {
    /// One probe per second.
    #[default]
    Standard,
    /// One probe every 200 ms.
    Aggressive,
    /// Uniformly random wait in `[500, 3000)` ms, drawn for every wait.
    Intermittent,
}

impl ExperimentMode {
    pub fn interval_ms_with<R: Rng>(&self, rng: &mut R) -> u64 {
        match self {
            ExperimentMode::Standard => STANDARD_INTERVAL_MS,
            ExperimentMode::Aggressive => AGGRESSIVE_INTERVAL_MS,
            ExperimentMode::Intermittent => rng.gen_range(INTERMITTENT_INTERVAL_MS),
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms_with(&mut rand::thread_rng())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms())
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExperimentMode::Standard => "standard",
            ExperimentMode::Aggressive => "aggressive",
            ExperimentMode::Intermittent => "intermittent",
        }
    }
}

impl fmt::Display for ExperimentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Modes are numbered 1 to 3 on the command line.
impl TryFrom<u8> for ExperimentMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ExperimentMode::Standard),
            2 => Ok(ExperimentMode::Aggressive),
            3 => Ok(ExperimentMode::Intermittent),
            other => Err(Error::InvalidMode(other)),
        }
    }
}
