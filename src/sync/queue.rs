//! `BlockingQueue`: FIFO queue with blocking consumers and a chosen backpressure.
//!
//! Window message queues need non-blocking peeks, which channel types do not
//! offer, so this is a `VecDeque` behind a mutex with two condition variables.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// What `push` does when a bounded queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backpressure {
    /// Block the producer until a consumer makes room.
    Block,
    /// Discard the oldest queued value to make room.
    DropOldest,
    /// Refuse the new value and hand it back to the producer.
    Reject,
}

/// A value refused by a full queue configured with [`Backpressure::Reject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected<T>(pub T);

impl<T> fmt::Display for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("queue is full")
    }
}

struct Inner<T> {
    items: VecDeque<T>,
    /// Values discarded by `DropOldest` since creation.
    dropped: u64,
}

/// A FIFO queue whose `pop` blocks until a value is available.
///
/// Every `push` wakes exactly one blocked consumer.
pub struct BlockingQueue<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: Option<usize>,
    policy: Backpressure,
}

impl<T> BlockingQueue<T> {
    /// Create a queue with no length limit.
    ///
    /// A stalled consumer makes an unbounded queue grow without limit; prefer
    /// [`BlockingQueue::bounded`] for anything fed on a timer.
    pub fn unbounded() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                dropped: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity: None,
            policy: Backpressure::Block,
        }
    }

    /// Create a queue holding at most `capacity` values.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn bounded(capacity: usize, policy: Backpressure) -> Self {
        assert!(capacity > 0, "BlockingQueue capacity must be non-zero");
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                dropped: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity: Some(capacity),
            policy,
        }
    }

    /// Length limit, if any.
    #[inline]
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Policy applied when the queue is full.
    #[inline]
    pub const fn policy(&self) -> Backpressure {
        self.policy
    }

    /// Append a value and wake one blocked consumer.
    ///
    /// Only a full queue with [`Backpressure::Reject`] fails.
    pub fn push(&self, value: T) -> Result<(), Rejected<T>> {
        let mut inner = self.inner.lock();
        if let Some(capacity) = self.capacity {
            while inner.items.len() >= capacity {
                match self.policy {
                    Backpressure::Block => self.not_full.wait(&mut inner),
                    Backpressure::DropOldest => {
                        inner.items.pop_front();
                        inner.dropped += 1;
                    }
                    Backpressure::Reject => return Err(Rejected(value)),
                }
            }
        }
        inner.items.push_back(value);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove and return the head, blocking until one is available.
    pub fn pop(&self) -> T {
        let mut inner = self.inner.lock();
        loop {
            if let Some(value) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return value;
            }
            self.not_empty.wait(&mut inner);
        }
    }

    /// Remove and return the head, waiting at most `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        loop {
            if let Some(value) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return Some(value);
            }
            if self.not_empty.wait_until(&mut inner, deadline).timed_out() {
                let value = inner.items.pop_front();
                if value.is_some() {
                    drop(inner);
                    self.not_full.notify_one();
                }
                return value;
            }
        }
    }

    /// Remove and return the head without blocking.
    pub fn try_pop(&self) -> Option<T> {
        let value = self.inner.lock().items.pop_front();
        if value.is_some() {
            self.not_full.notify_one();
        }
        value
    }

    /// Remove every queued value, oldest first.
    pub fn drain(&self) -> Vec<T> {
        let drained: Vec<T> = self.inner.lock().items.drain(..).collect();
        if !drained.is_empty() {
            self.not_full.notify_all();
        }
        drained
    }

    /// Number of queued values.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Check if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Values discarded by [`Backpressure::DropOldest`] so far.
    pub fn dropped(&self) -> u64 {
        self.inner.lock().dropped
    }
}

impl<T: Clone> BlockingQueue<T> {
    /// Return the head without blocking.
    ///
    /// With `removing` set the head is also taken off the queue. Returns
    /// `None` on an empty queue.
    pub fn peek(&self, removing: bool) -> Option<T> {
        if removing {
            return self.try_pop();
        }
        self.inner.lock().items.front().cloned()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = BlockingQueue::unbounded();
        for i in 0..10 {
            queue.push(i).unwrap();
        }
        let popped: Vec<_> = (0..10).map(|_| queue.pop()).collect();
        assert_eq!(popped, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_blocked_pop_receives_pushed_value() {
        let queue = Arc::new(BlockingQueue::unbounded());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };
        thread::sleep(Duration::from_millis(30));
        queue.push(42u32).unwrap();
        assert_eq!(consumer.join().unwrap(), 42);
    }

    #[test]
    fn test_push_wakes_exactly_one_consumer() {
        let queue = Arc::new(BlockingQueue::unbounded());
        let (tx, rx) = std::sync::mpsc::channel();
        let consumers: Vec<_> = (0..2)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let tx = tx.clone();
                thread::spawn(move || tx.send(queue.pop()).unwrap())
            })
            .collect();
        thread::sleep(Duration::from_millis(30));

        queue.push(1u32).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(1));
        // The other consumer is still blocked.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert!(queue.is_empty());

        queue.push(2).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(2));
        for consumer in consumers {
            consumer.join().unwrap();
        }
    }

    #[test]
    fn test_peek_without_removing() {
        let queue = BlockingQueue::unbounded();
        queue.push('a').unwrap();
        queue.push('b').unwrap();
        assert_eq!(queue.peek(false), Some('a'));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek(true), Some('a'));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_peek_empty_does_not_block() {
        let queue = BlockingQueue::<u8>::unbounded();
        assert_eq!(queue.peek(false), None);
        assert_eq!(queue.peek(true), None);
    }

    #[test]
    fn test_pop_timeout_expires() {
        let queue = BlockingQueue::<u8>::unbounded();
        let start = Instant::now();
        assert_eq!(queue.pop_timeout(Duration::from_millis(20)), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_drop_oldest_policy() {
        let queue = BlockingQueue::bounded(3, Backpressure::DropOldest);
        for i in 0..5 {
            queue.push(i).unwrap();
        }
        assert_eq!(queue.drain(), vec![2, 3, 4]);
        assert_eq!(queue.dropped(), 2);
    }

    #[test]
    fn test_reject_policy() {
        let queue = BlockingQueue::bounded(1, Backpressure::Reject);
        queue.push("first").unwrap();
        assert_eq!(queue.push("second"), Err(Rejected("second")));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_block_policy_waits_for_room() {
        let queue = Arc::new(BlockingQueue::bounded(1, Backpressure::Block));
        queue.push(1).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.push(2).unwrap())
        };
        thread::sleep(Duration::from_millis(30));
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.pop(), 1);
        producer.join().unwrap();
        assert_eq!(queue.pop(), 2);
    }
}
