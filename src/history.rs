use std::time::Duration;
use tokio::time::Instant;

/// Maximum number of probes tracked for statistics.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Ledger entry for one sequence number.
#[derive(Clone, Debug)]
pub struct ProbeRecord {
    pub sequence: u64,
    /// First transmission of this sequence; retries do not update it.
    pub sent_at: Instant,
    pub retry_count: u32,
    pub received: bool,
    /// Latency of the attempt that was answered, measured from that
    /// attempt's own send time. Zero until `received`.
    pub rtt: Duration,
    pub corrupted: bool,
}

impl ProbeRecord {
    pub fn rtt_ms(&self) -> f64 {
        self.rtt.as_secs_f64() * 1000.0
    }
}

/// Run-wide counters, kept independently of the ledger so they stay exact
/// once the ledger is full.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunCounters {
    /// Original probes, one per sequence number.
    pub original_sent: u64,
    /// Successful transmissions, retries included.
    pub transmitted: u64,
    /// Matched replies, corrupted ones included.
    pub received: u64,
    pub retransmitted: u64,
    pub received_after_retry: u64,
    pub corrupted: u64,
}

/// Capacity-bounded ledger indexed by sequence number.
///
/// Sequences start at 0 and grow by one, so the record for sequence `n`
/// lives at index `n`. Once `capacity` records exist new sequences are no
/// longer tracked, but the counters keep counting.
#[derive(Clone, Debug)]
pub struct History {
    records: Vec<ProbeRecord>,
    capacity: usize,
    counters: RunCounters,
}

impl Default for History {
    fn default() -> Self {
        History::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> History {
        History {
            records: Vec::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
            counters: RunCounters::default(),
        }
    }

    pub fn records(&self) -> &[ProbeRecord] {
        &self.records
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, sequence: u64) -> Option<&ProbeRecord> {
        usize::try_from(sequence)
            .ok()
            .and_then(|index| self.records.get(index))
    }

    fn get_mut(&mut self, sequence: u64) -> Option<&mut ProbeRecord> {
        usize::try_from(sequence)
            .ok()
            .and_then(|index| self.records.get_mut(index))
    }

    /// Counts a new original probe and tracks it if capacity remains.
    pub fn record_sent(&mut self, sequence: u64, sent_at: Instant) {
        self.counters.original_sent += 1;
        if self.records.len() >= self.capacity || sequence != self.records.len() as u64 {
            return;
        }
        self.records.push(ProbeRecord {
            sequence,
            sent_at,
            retry_count: 0,
            received: false,
            rtt: Duration::ZERO,
            corrupted: false,
        });
    }

    /// Counts one successful transmission, original or retry.
    pub fn record_transmission(&mut self) {
        self.counters.transmitted += 1;
    }

    /// Counts a retransmission and bumps the record's retry count.
    pub fn record_retry(&mut self, sequence: u64) {
        self.counters.retransmitted += 1;
        if let Some(record) = self.get_mut(sequence) {
            record.retry_count += 1;
        }
    }

    /// Counts one matched reply, tracked or not.
    pub fn record_match(&mut self, corrupted: bool) {
        self.counters.received += 1;
        if corrupted {
            self.counters.corrupted += 1;
        }
    }

    /// Marks the record for `sequence` as answered. Returns `false`, changing
    /// nothing, if the sequence is untracked or was already answered.
    pub fn record_reply(&mut self, sequence: u64, rtt: Duration, corrupted: bool) -> bool {
        let record = match self.get_mut(sequence) {
            Some(record) if !record.received => record,
            _ => return false,
        };
        record.received = true;
        record.rtt = rtt;
        record.corrupted = corrupted;
        if record.retry_count > 0 {
            self.counters.received_after_retry += 1;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn records_are_indexed_by_sequence() {
        let mut history = History::default();
        let now = Instant::now();
        for seq in 0..3 {
            history.record_sent(seq, now);
        }
        assert_eq!(history.records().len(), 3);
        assert_eq!(history.get(2).map(|r| r.sequence), Some(2));
        assert!(history.get(3).is_none());
        assert_eq!(history.counters().original_sent, 3);
    }

    #[test]
    fn reply_is_idempotent() {
        let mut history = History::default();
        history.record_sent(0, Instant::now());
        history.record_retry(0);
        assert!(history.record_reply(0, ms(12), false));
        assert!(!history.record_reply(0, ms(99), true));

        let record = history.get(0).unwrap();
        assert!(record.received);
        assert_eq!(record.rtt, ms(12));
        assert!(!record.corrupted);
        assert_eq!(record.retry_count, 1);

        assert_eq!(history.counters().received_after_retry, 1);
    }

    #[test]
    fn reply_without_retry_is_not_counted_as_rereceived() {
        let mut history = History::default();
        history.record_sent(0, Instant::now());
        history.record_match(true);
        history.record_reply(0, ms(3), true);
        assert_eq!(history.counters().received_after_retry, 0);
        assert_eq!(history.counters().received, 1);
        assert_eq!(history.counters().corrupted, 1);
        assert!(history.get(0).unwrap().corrupted);
    }

    #[test]
    fn full_ledger_drops_tracking_but_keeps_counting() {
        let mut history = History::with_capacity(2);
        let now = Instant::now();
        for seq in 0..4 {
            history.record_sent(seq, now);
            history.record_transmission();
        }
        history.record_retry(3);
        history.record_match(false);
        assert!(!history.record_reply(3, ms(5), false));

        assert_eq!(history.records().len(), 2);
        assert!(history.get(3).is_none());
        let counters = history.counters();
        assert_eq!(counters.original_sent, 4);
        assert_eq!(counters.transmitted, 4);
        assert_eq!(counters.retransmitted, 1);
        assert_eq!(counters.received, 1);
        assert_eq!(counters.received_after_retry, 0);
    }

    #[test]
    fn reply_past_capacity_leaves_ledger_alone() {
        let mut history = History::with_capacity(1);
        let now = Instant::now();
        history.record_sent(0, now);
        history.record_sent(1, now);
        history.record_retry(1);

        assert!(!history.record_reply(1, ms(5), true));
        assert!(!history.record_reply(1, ms(5), true));

        assert!(history.get(1).is_none());
        assert!(!history.get(0).unwrap().received);
        let counters = history.counters();
        assert_eq!(counters.received, 0);
        assert_eq!(counters.corrupted, 0);
        assert_eq!(counters.received_after_retry, 0);
    }

    #[test]
    fn retry_on_untracked_sequence_is_harmless() {
        let mut history = History::with_capacity(0);
        history.record_sent(0, Instant::now());
        history.record_retry(0);
        assert!(history.records().is_empty());
        assert_eq!(history.counters().retransmitted, 1);
    }
}
