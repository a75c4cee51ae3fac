use crate::history::History;
use std::fmt;

/// Min/avg/max over uncorrupted replies, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RttSummary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

/// End-of-run summary of a [`History`].
#[derive(Clone, Debug, PartialEq)]
pub struct Statistics {
    pub original_sent: u64,
    pub transmitted: u64,
    pub received: u64,
    pub retransmitted: u64,
    pub received_after_retry: u64,
    pub corrupted: u64,
    /// Percentage of original probes never answered; 0 when nothing was sent.
    pub loss_percent: f64,
    /// `None` when no uncorrupted reply was recorded.
    pub rtt: Option<RttSummary>,
}

impl Statistics {
    pub fn from_history(history: &History) -> Statistics {
        let counters = history.counters();
        let loss_percent = if counters.original_sent == 0 {
            0.0
        } else {
            counters.original_sent.saturating_sub(counters.received) as f64 * 100.0
                / counters.original_sent as f64
        };

        let samples: Vec<f64> = history
            .records()
            .iter()
            .filter(|r| r.received && !r.corrupted)
            .map(|r| r.rtt_ms())
            .collect();
        let rtt = if samples.is_empty() {
            None
        } else {
            Some(RttSummary {
                min: samples.iter().copied().fold(f64::INFINITY, f64::min),
                avg: samples.iter().sum::<f64>() / samples.len() as f64,
                max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            })
        };

        Statistics {
            original_sent: counters.original_sent,
            transmitted: counters.transmitted,
            received: counters.received,
            retransmitted: counters.retransmitted,
            received_after_retry: counters.received_after_retry,
            corrupted: counters.corrupted,
            loss_percent,
            rtt,
        }
    }

    /// Emits the summary through the log sink, one event per line.
    pub fn report(&self) {
        for line in self.to_string().lines() {
            tracing::info!("{}", line);
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "--- Ping Statistics ---")?;
        writeln!(
            f,
            "Total packets: {} original, {} including retries",
            self.original_sent, self.transmitted
        )?;
        writeln!(
            f,
            "Received: {} ({:.1}% packet loss)",
            self.received, self.loss_percent
        )?;
        writeln!(f, "Retransmitted: {}", self.retransmitted)?;
        writeln!(f, "Received after retry: {}", self.received_after_retry)?;
        write!(f, "Corrupted packets: {}", self.corrupted)?;
        if let Some(rtt) = self.rtt {
            writeln!(f)?;
            write!(
                f,
                "RTT min/avg/max = {:.3}/{:.3}/{:.3} ms",
                rtt.min, rtt.avg, rtt.max
            )?;
        }
        Ok(())
    }
}
