//! Time- and size-bounded batching of producer lines.
//!
//! The buffer owns no timer. It exposes the deadline of its oldest pending
//! item and the controller's event loop sleeps on it, so exactly one
//! deadline is live at a time and clearing the buffer cancels it.

use std::time::Duration;

use tokio::time::Instant;

/// Receives each flushed batch. Never called with an empty batch.
pub type BatchSink<T> = Box<dyn FnMut(Vec<T>) + Send>;

pub struct BatchBuffer<T> {
    pending: Vec<T>,
    deadline: Option<Instant>,
    interval: Duration,
    max_size: usize,
    sink: BatchSink<T>,
}

impl<T> BatchBuffer<T> {
    /// Create a buffer that flushes `interval` after its first pending item
    /// or as soon as it holds `max_size` items.
    pub fn new(interval: Duration, max_size: usize, sink: BatchSink<T>) -> Self {
        let max_size = max_size.max(1);
        Self {
            pending: Vec::with_capacity(max_size.min(1024)),
            deadline: None,
            interval,
            max_size,
            sink,
        }
    }

    /// Buffer an item, flushing immediately if the size ceiling is reached.
    pub fn add(&mut self, item: T) {
        if self.pending.is_empty() {
            self.deadline = Some(Instant::now() + self.interval);
        }
        self.pending.push(item);
        if self.pending.len() >= self.max_size {
            self.flush();
        }
    }

    /// Hand everything pending to the sink. No-op when empty.
    pub fn flush(&mut self) {
        self.deadline = None;
        if self.pending.is_empty() {
            return;
        }
        let batch = std::mem::replace(&mut self.pending, Vec::with_capacity(self.max_size.min(1024)));
        (self.sink)(batch);
    }

    /// Flush if the interval deadline has passed.
    pub fn flush_if_due(&mut self, now: Instant) {
        if self.deadline.is_some_and(|deadline| deadline <= now) {
            self.flush();
        }
    }

    /// Drop everything pending and cancel the deadline.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadline = None;
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> std::fmt::Debug for BatchBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchBuffer")
            .field("pending", &self.pending.len())
            .field("deadline", &self.deadline)
            .field("interval", &self.interval)
            .field("max_size", &self.max_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Batches = Arc<Mutex<Vec<Vec<u32>>>>;

    fn buffer(interval_ms: u64, max: usize) -> (BatchBuffer<u32>, Batches) {
        let batches: Batches = Arc::default();
        let sink_batches = Arc::clone(&batches);
        let buffer = BatchBuffer::new(
            Duration::from_millis(interval_ms),
            max,
            Box::new(move |batch| sink_batches.lock().unwrap().push(batch)),
        );
        (buffer, batches)
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_size_flush_caps_batches() {
        let (mut buffer, batches) = buffer(100, 500);
        for i in 0..1234 {
            buffer.add(i);
        }

        let sizes: Vec<usize> = batches.lock().unwrap().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![500, 500]);
        assert_eq!(buffer.len(), 234);

        buffer.flush();
        let all: Vec<u32> = batches.lock().unwrap().concat();
        assert_eq!(all, (0..1234).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_deadline_is_interval_after_first_item() {
        let (mut buffer, batches) = buffer(100, 500);
        let start = Instant::now();
        buffer.add(1);

        tokio::time::advance(Duration::from_millis(60)).await;
        buffer.add(2);
        assert_eq!(buffer.deadline(), Some(start + Duration::from_millis(100)));

        buffer.flush_if_due(Instant::now());
        assert!(batches.lock().unwrap().is_empty());

        tokio::time::sleep_until(buffer.deadline().unwrap()).await;
        buffer.flush_if_due(Instant::now());
        assert!(start.elapsed() <= Duration::from_millis(100));
        assert_eq!(*batches.lock().unwrap(), vec![vec![1, 2]]);
        assert_eq!(buffer.deadline(), None);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_new_deadline_after_flush() {
        let (mut buffer, _batches) = buffer(100, 500);
        buffer.add(1);
        buffer.flush();

        tokio::time::advance(Duration::from_millis(30)).await;
        let now = Instant::now();
        buffer.add(2);
        assert_eq!(buffer.deadline(), Some(now + Duration::from_millis(100)));
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let (mut buffer, batches) = buffer(100, 10);
        buffer.flush();
        assert!(batches.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_clear_cancels_deadline() {
        let (mut buffer, batches) = buffer(100, 10);
        buffer.add(1);
        buffer.clear();
        assert_eq!(buffer.deadline(), None);
        assert!(buffer.is_empty());

        tokio::time::advance(Duration::from_millis(500)).await;
        buffer.flush_if_due(Instant::now());
        assert!(batches.lock().unwrap().is_empty());
    }
}
