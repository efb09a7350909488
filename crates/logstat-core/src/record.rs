//! Log record model as seen by the accounting engine.

use logstat_common::{LogId, ProcessId, UserId};
use serde::{Deserialize, Serialize};

/// One resident buffer record.
///
/// A record with `dropped_count > 0` is a placeholder standing in for that
/// many lost messages; its payload has been released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    log_id: LogId,
    uid: UserId,
    pid: ProcessId,
    size: usize,
    dropped_count: usize,
}

impl LogRecord {
    /// A live record carrying `size` bytes of payload.
    pub fn new(log_id: LogId, uid: UserId, pid: ProcessId, size: usize) -> Self {
        Self {
            log_id,
            uid,
            pid,
            size,
            dropped_count: 0,
        }
    }

    pub fn log_id(&self) -> LogId {
        self.log_id
    }

    pub fn uid(&self) -> UserId {
        self.uid
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Payload size recorded at creation, kept after a drop.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped_count
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped_count > 0
    }

    /// Bytes this record currently holds: zero once dropped.
    pub fn payload_len(&self) -> usize {
        if self.is_dropped() {
            0
        } else {
            self.size
        }
    }

    /// True when `other` can be folded into this placeholder.
    pub fn can_merge(&self, other: &LogRecord) -> bool {
        self.is_dropped()
            && other.is_dropped()
            && self.log_id == other.log_id
            && self.uid == other.uid
            && self.pid == other.pid
    }

    pub(crate) fn mark_dropped(&mut self) {
        self.dropped_count = 1;
    }

    pub(crate) fn absorb_dropped(&mut self, count: usize) {
        self.dropped_count = self.dropped_count.saturating_add(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(size: usize) -> LogRecord {
        LogRecord::new(LogId::Main, UserId(1000), ProcessId(50), size)
    }

    #[test]
    fn test_live_record_payload() {
        let rec = record(120);
        assert!(!rec.is_dropped());
        assert_eq!(rec.payload_len(), 120);
    }

    #[test]
    fn test_dropped_record_has_no_payload() {
        let mut rec = record(120);
        rec.mark_dropped();
        assert!(rec.is_dropped());
        assert_eq!(rec.dropped_count(), 1);
        assert_eq!(rec.payload_len(), 0);
        assert_eq!(rec.size(), 120);
    }

    #[test]
    fn test_merge_requires_same_origin_placeholders() {
        let mut a = record(10);
        let mut b = record(20);
        assert!(!a.can_merge(&b));
        a.mark_dropped();
        b.mark_dropped();
        assert!(a.can_merge(&b));

        let mut other = LogRecord::new(LogId::System, UserId(1000), ProcessId(50), 5);
        other.mark_dropped();
        assert!(!a.can_merge(&other));
    }
}
