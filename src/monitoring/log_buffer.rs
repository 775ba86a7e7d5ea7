use crate::shared_data::LogEntry;
use std::collections::VecDeque;

/// Most-recent-first log history with a fixed capacity.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Inserts at the front. Returns the evicted oldest entry when full.
    pub fn push(&mut self, entry: LogEntry) -> Option<LogEntry> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_data::{Severity, SimTime};

    fn entry(n: u64) -> LogEntry {
        LogEntry::new(SimTime(n * 1000), Severity::Info, format!("entry {}", n))
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut buffer = LogBuffer::new(3);
        buffer.push(entry(1));
        buffer.push(entry(2));
        assert_eq!(buffer.latest().map(|e| e.message.as_str()), Some("entry 2"));
    }

    #[test]
    fn overflow_evicts_exactly_the_oldest() {
        let mut buffer = LogBuffer::new(20);
        for n in 0..20 {
            assert!(buffer.push(entry(n)).is_none());
        }
        let evicted = buffer.push(entry(20));
        assert_eq!(evicted, Some(entry(0)));
        assert_eq!(buffer.len(), 20);
        let messages: Vec<_> = buffer.iter().map(|e| e.message.clone()).collect();
        assert_eq!(messages.first().map(String::as_str), Some("entry 20"));
        assert_eq!(messages.last().map(String::as_str), Some("entry 1"));
    }

    #[test]
    fn clear_empties_history() {
        let mut buffer = LogBuffer::new(5);
        buffer.push(entry(1));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 5);
    }
}
