//! Timestamped snapshots and the sorted buffer that holds them.

/// A sample of remote state with its send and receipt times.
pub trait Snapshot {
    /// Time the sender produced the snapshot, on the sender's clock.
    fn remote_time(&self) -> f64;

    /// Time the snapshot arrived, on the local clock.
    fn local_time(&self) -> f64;
}

/// A snapshot carrying only its two timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeSnapshot {
    pub remote_time: f64,
    pub local_time: f64,
}

impl TimeSnapshot {
    #[must_use]
    pub const fn new(remote_time: f64, local_time: f64) -> Self {
        Self {
            remote_time,
            local_time,
        }
    }
}

impl Snapshot for TimeSnapshot {
    fn remote_time(&self) -> f64 {
        self.remote_time
    }

    fn local_time(&self) -> f64 {
        self.local_time
    }
}

/// Snapshots sorted by remote time, unique by remote time, with a hard
/// capacity.
#[derive(Debug, Clone)]
pub struct SnapshotBuffer<T> {
    items: Vec<T>,
    limit: usize,
}

impl<T: Snapshot> SnapshotBuffer<T> {
    /// Creates an empty buffer holding at most `limit` snapshots.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Inserts `snapshot` in remote-time order.
    ///
    /// Returns `true` if a new entry was added. Returns `false` when the
    /// buffer is full (nothing changes) or when an entry with the same
    /// remote time exists (that entry is overwritten).
    pub fn insert_if_not_exists(&mut self, snapshot: T) -> bool {
        if self.items.len() >= self.limit {
            return false;
        }
        let key = snapshot.remote_time();
        match self
            .items
            .binary_search_by(|probe| probe.remote_time().total_cmp(&key))
        {
            Ok(existing) => {
                self.items[existing] = snapshot;
                false
            }
            Err(slot) => {
                self.items.insert(slot, snapshot);
                true
            }
        }
    }

    /// Drops every snapshot before `index`.
    pub fn remove_before(&mut self, index: usize) {
        let end = index.min(self.items.len());
        self.items.drain(..end);
    }
}

impl<T> SnapshotBuffer<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if no more snapshots can be inserted.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    /// Returns the capacity limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns the oldest snapshot.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Returns the newest snapshot.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a, T> IntoIterator for &'a SnapshotBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_times(buffer: &SnapshotBuffer<TimeSnapshot>) -> Vec<f64> {
        buffer.iter().map(|s| s.remote_time).collect()
    }

    #[test]
    fn inserts_sorted() {
        let mut buffer = SnapshotBuffer::new(8);
        assert!(buffer.insert_if_not_exists(TimeSnapshot::new(2.0, 0.0)));
        assert!(buffer.insert_if_not_exists(TimeSnapshot::new(1.0, 0.0)));
        assert!(buffer.insert_if_not_exists(TimeSnapshot::new(3.0, 0.0)));
        assert_eq!(remote_times(&buffer), vec![1.0, 2.0, 3.0]);
        assert_eq!(buffer.first().unwrap().remote_time, 1.0);
        assert_eq!(buffer.last().unwrap().remote_time, 3.0);
    }

    #[test]
    fn duplicate_overwrites_and_reports_false() {
        let mut buffer = SnapshotBuffer::new(8);
        buffer.insert_if_not_exists(TimeSnapshot::new(1.0, 10.0));
        assert!(!buffer.insert_if_not_exists(TimeSnapshot::new(1.0, 20.0)));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.get(0).unwrap().local_time, 20.0);
    }

    #[test]
    fn full_buffer_rejects() {
        let mut buffer = SnapshotBuffer::new(2);
        buffer.insert_if_not_exists(TimeSnapshot::new(1.0, 0.0));
        buffer.insert_if_not_exists(TimeSnapshot::new(2.0, 0.0));
        assert!(buffer.is_full());
        assert!(!buffer.insert_if_not_exists(TimeSnapshot::new(3.0, 0.0)));
        assert_eq!(remote_times(&buffer), vec![1.0, 2.0]);
    }

    #[test]
    fn remove_before_evicts_prefix() {
        let mut buffer = SnapshotBuffer::new(8);
        for t in [1.0, 2.0, 3.0, 4.0] {
            buffer.insert_if_not_exists(TimeSnapshot::new(t, 0.0));
        }
        buffer.remove_before(2);
        assert_eq!(remote_times(&buffer), vec![3.0, 4.0]);
        buffer.remove_before(10);
        assert!(buffer.is_empty());
    }

    #[test]
    fn zero_limit_holds_nothing() {
        let mut buffer = SnapshotBuffer::new(0);
        assert!(!buffer.insert_if_not_exists(TimeSnapshot::new(1.0, 0.0)));
        assert!(buffer.is_empty());
    }
}
