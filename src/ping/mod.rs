mod engine;
pub mod pacing;
mod pinger;

pub use engine::ProbeEngine;
pub use pacing::ExperimentMode;
pub use pinger::*;

use crate::history::History;
use crate::stats::Statistics;
use std::time::Duration;

/// Exit status of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PingStatus {
    /// Every requested probe was sent
    Done,
    /// Stopped by a cancellation request
    Interrupted,
}

/// Result of a run
#[derive(Clone, Debug)]
pub struct PingResult {
    /// Per-sequence ledger and run counters
    pub history: History,
    /// Summary computed once when the run stopped
    pub statistics: Statistics,
    /// Run status
    pub status: PingStatus,
    /// The entire probe time
    pub probe_time: Duration,
}
