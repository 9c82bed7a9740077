//! The stream value type: append-ordered entries stamped with (ms, seq)
//! ids that only ever grow.

use crate::util::now_ms;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct StreamId {
    pub ms: u64,
    pub seq: u64,
}

impl StreamId {
    pub const MIN: StreamId = StreamId { ms: 0, seq: 0 };
    pub const MAX: StreamId = StreamId { ms: u64::MAX, seq: u64::MAX };

    /// Parse `ms` or `ms-seq`; a missing sequence part takes
    /// `default_seq`, which lets range ends default to the widest match.
    pub fn parse(raw: &[u8], default_seq: u64) -> Option<StreamId> {
        let raw = std::str::from_utf8(raw).ok()?;
        match raw.split_once('-') {
            Some((ms, seq)) => {
                Some(StreamId { ms: ms.parse().ok()?, seq: seq.parse().ok()? })
            },
            None => {
                Some(StreamId { ms: raw.parse().ok()?, seq: default_seq })
            },
        }
    }

    pub fn format(&self) -> String {
        format!("{}-{}", self.ms, self.seq)
    }
}

pub struct StreamEntry {
    pub id: StreamId,
    pub fields: Vec<(Vec<u8>, Vec<u8>)>,
}

/// Entries are held in arrival order; appending to the tail keeps the id
/// sequence strictly increasing.
pub struct Stream {
    entries: Vec<StreamEntry>,
}

impl Stream {
    pub fn new() -> Stream {
        Stream { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_id(&self) -> Option<StreamId> {
        self.entries.last().map(|e| e.id)
    }

    /// Stamp a fresh auto-generated id: current wall-clock ms with seq 0,
    /// or last-ms with a bumped seq when the clock has not advanced (or
    /// went backwards).
    pub fn next_auto_id(&self) -> StreamId {
        let ms = now_ms();
        match self.last_id() {
            Some(last) if ms <= last.ms => StreamId { ms: last.ms, seq: last.seq + 1 },
            _ => StreamId { ms, seq: 0 },
        }
    }

    /// Append one entry. The id must be strictly greater than the last
    /// one; anything else is rejected so ids stay monotonic.
    pub fn add(&mut self, id: StreamId, fields: Vec<(Vec<u8>, Vec<u8>)>) -> Result<StreamId, ()> {
        if let Some(last) = self.last_id() {
            if id <= last {
                return Err(());
            }
        }
        self.entries.push(StreamEntry { id, fields });
        Ok(id)
    }

    /// Entries with ids in `[start, end]`, inclusive on both ends.
    pub fn range(&self, start: StreamId, end: StreamId) -> Vec<&StreamEntry> {
        self.entries.iter()
            .filter(|e| e.id >= start && e.id <= end)
            .collect()
    }

    /// Entries with ids strictly greater than `after`.
    pub fn read(&self, after: StreamId) -> Vec<&StreamEntry> {
        self.entries.iter()
            .filter(|e| e.id > after)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(Vec<u8>, Vec<u8>)> {
        pairs.iter()
            .map(|(f, v)| (f.as_bytes().to_vec(), v.as_bytes().to_vec()))
            .collect()
    }

    #[test]
    fn id_parse_test() {
        assert_eq!(StreamId::parse(b"5-3", 0), Some(StreamId { ms: 5, seq: 3 }));
        assert_eq!(StreamId::parse(b"7", 0), Some(StreamId { ms: 7, seq: 0 }));
        assert_eq!(StreamId::parse(b"7", u64::MAX), Some(StreamId { ms: 7, seq: u64::MAX }));
        assert_eq!(StreamId::parse(b"x", 0), None);
        assert_eq!(StreamId::parse(b"1-y", 0), None);
        assert_eq!(StreamId { ms: 12, seq: 4 }.format(), "12-4");
    }

    #[test]
    fn add_monotonic_test() {
        let mut s = Stream::new();
        assert!(s.add(StreamId { ms: 1, seq: 0 }, fields(&[("a", "1")])).is_ok());
        assert!(s.add(StreamId { ms: 1, seq: 1 }, fields(&[("b", "2")])).is_ok());
        // Equal and smaller ids are rejected
        assert!(s.add(StreamId { ms: 1, seq: 1 }, fields(&[("c", "3")])).is_err());
        assert!(s.add(StreamId { ms: 0, seq: 9 }, fields(&[("c", "3")])).is_err());
        assert_eq!(s.len(), 2);
        assert_eq!(s.last_id(), Some(StreamId { ms: 1, seq: 1 }));
    }

    #[test]
    fn auto_id_test() {
        let mut s = Stream::new();
        let first = s.next_auto_id();
        s.add(first, fields(&[("f", "v")])).unwrap();
        // If the clock stalls inside one millisecond the sequence bumps
        let second = s.next_auto_id();
        assert!(second > first);
        s.add(second, fields(&[("f", "v")])).unwrap();

        // A stream whose last id sits in the future keeps its ms and
        // bumps seq, even though the wall clock is behind it.
        let mut ahead = Stream::new();
        ahead.add(StreamId { ms: u64::MAX - 1, seq: 2 }, fields(&[("f", "v")])).unwrap();
        let id = ahead.next_auto_id();
        assert_eq!(id, StreamId { ms: u64::MAX - 1, seq: 3 });
    }

    #[test]
    fn range_read_test() {
        let mut s = Stream::new();
        for i in 1..=5u64 {
            s.add(StreamId { ms: i, seq: 0 }, fields(&[("n", "x")])).unwrap();
        }

        let all = s.range(StreamId::MIN, StreamId::MAX);
        assert_eq!(all.len(), 5);

        let mid = s.range(StreamId { ms: 2, seq: 0 }, StreamId { ms: 4, seq: 0 });
        assert_eq!(mid.len(), 3);
        assert_eq!(mid[0].id.ms, 2);
        assert_eq!(mid[2].id.ms, 4);

        let after = s.read(StreamId { ms: 3, seq: 0 });
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id.ms, 4);
    }
}
