//! Append-only audit log for registry mutations.

use parking_lot::RwLock;
use storium_types::{storium_time_now, AuditEvent, AuditRecord};
use tracing::info;

/// In-memory append-only event log.
///
/// Sequence numbers start at 1 and follow append order; records are never
/// mutated or deleted. Every append also emits a structured tracing event
/// so operators see mutations without polling the feed.
pub struct AuditLog {
    records: RwLock<Vec<AuditRecord>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Append one event, assigning the next sequence number.
    pub fn append(&self, event: AuditEvent) -> AuditRecord {
        let mut records = self.records.write();
        let record = AuditRecord {
            seq: records.len() as u64 + 1,
            time_us: storium_time_now(),
            event,
        };

        info!(
            kind = record.event.kind(),
            actor = %record.event.actor(),
            seq = record.seq,
            "audit event"
        );

        records.push(record.clone());
        record
    }

    /// Records with `seq > after`, oldest first, capped at `limit`.
    pub fn events_since(&self, after: u64, limit: usize) -> Vec<AuditRecord> {
        let records = self.records.read();
        records
            .iter()
            .skip(after as usize)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Sequence number of the newest record, 0 when the log is empty.
    pub fn latest_seq(&self) -> u64 {
        self.records.read().len() as u64
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storium_types::{FileId, Identity};

    fn deleted_event(byte: u8, id: u64) -> AuditEvent {
        AuditEvent::FileDeleted {
            actor: Identity([byte; 20]),
            file_id: FileId(id),
        }
    }

    #[test]
    fn appends_are_sequenced_from_one() {
        let log = AuditLog::new();
        assert!(log.is_empty());

        let first = log.append(deleted_event(1, 10));
        let second = log.append(deleted_event(1, 11));

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert!(second.time_us >= first.time_us);
        assert_eq!(log.latest_seq(), 2);
    }

    #[test]
    fn feed_is_strictly_after_the_cursor() {
        let log = AuditLog::new();
        for id in 0..5 {
            log.append(deleted_event(1, id));
        }

        let all = log.events_since(0, 100);
        assert_eq!(all.len(), 5);
        assert!(all.windows(2).all(|pair| pair[0].seq < pair[1].seq));

        let tail = log.events_since(3, 100);
        assert_eq!(tail.len(), 2);
        assert!(tail.iter().all(|record| record.seq > 3));

        assert!(log.events_since(5, 100).is_empty());
    }

    #[test]
    fn feed_respects_the_limit() {
        let log = AuditLog::new();
        for id in 0..10 {
            log.append(deleted_event(1, id));
        }

        let page = log.events_since(0, 3);
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].seq, 1);
        assert_eq!(page[2].seq, 3);
    }
}
