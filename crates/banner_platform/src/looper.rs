//! Single-threaded message looper
//!
//! The looper is the event loop every widget on a screen shares. It owns a
//! queue of delayed messages and a clock. Messages are delivered strictly in
//! (due time, post order) and one at a time; a message posted from inside a
//! callback is queued behind everything already due.
//!
//! The clock is virtual: it only moves when the host calls
//! [`Looper::advance_by`] / [`Looper::advance_to`]. A real event loop paces
//! those calls against wall time (see the `banner_cli` driver); tests drive
//! the clock directly and never sleep.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use banner_platform::Looper;
//!
//! let looper = Looper::new();
//! let fired = Rc::new(Cell::new(0));
//!
//! let counter = Rc::clone(&fired);
//! let id = looper
//!     .post_delayed(Duration::from_secs(1), move || counter.set(counter.get() + 1))
//!     .unwrap();
//! assert!(looper.is_pending(id));
//!
//! looper.advance_by(Duration::from_secs(1));
//! assert_eq!(fired.get(), 1);
//! assert!(!looper.is_pending(id));
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::error::{PlatformError, Result};

new_key_type! {
    /// Handle to a posted message
    ///
    /// Keys are generational: once a message is delivered or removed its
    /// handle never matches a later message, even if the slot is reused.
    pub struct MessageId;
}

/// Ordering key inside the queue: due time, then post sequence
type QueueKey = (Duration, u64);

struct Message {
    key: QueueKey,
    callback: Box<dyn FnOnce()>,
}

struct LooperInner {
    now: Duration,
    messages: SlotMap<MessageId, Message>,
    queue: BTreeMap<QueueKey, MessageId>,
    next_seq: u64,
    quit: bool,
}

impl LooperInner {
    /// Pop the next message due at or before `deadline`
    fn pop_due(&mut self, deadline: Duration) -> Option<Box<dyn FnOnce()>> {
        let (&key, &id) = self.queue.first_key_value()?;
        if key.0 > deadline {
            return None;
        }
        self.queue.remove(&key);
        let message = self.messages.remove(id)?;
        if key.0 > self.now {
            self.now = key.0;
        }
        Some(message.callback)
    }
}

/// Shared handle to the message looper
///
/// Cloning is cheap and yields a handle to the same queue.
#[derive(Clone)]
pub struct Looper {
    inner: Rc<RefCell<LooperInner>>,
}

impl Looper {
    /// Create a looper with an empty queue at time zero
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(LooperInner {
                now: Duration::ZERO,
                messages: SlotMap::with_key(),
                queue: BTreeMap::new(),
                next_seq: 0,
                quit: false,
            })),
        }
    }

    /// Current looper time
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Post a message for delivery on the next turn of the loop
    pub fn post<F>(&self, callback: F) -> Result<MessageId>
    where
        F: FnOnce() + 'static,
    {
        self.post_delayed(Duration::ZERO, callback)
    }

    /// Post a message for delivery once `delay` has elapsed
    ///
    /// Fails with [`PlatformError::LooperQuit`] after [`Looper::quit`].
    pub fn post_delayed<F>(&self, delay: Duration, callback: F) -> Result<MessageId>
    where
        F: FnOnce() + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        if inner.quit {
            return Err(PlatformError::LooperQuit);
        }

        let key = (inner.now + delay, inner.next_seq);
        inner.next_seq += 1;
        let id = inner.messages.insert(Message {
            key,
            callback: Box::new(callback),
        });
        inner.queue.insert(key, id);

        tracing::trace!("looper: posted {:?} due at {:?}", id, key.0);
        Ok(id)
    }

    /// Remove a pending message
    ///
    /// Returns false if the message was already delivered or removed.
    pub fn remove(&self, id: MessageId) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.messages.remove(id) {
            Some(message) => {
                inner.queue.remove(&message.key);
                tracing::trace!("looper: removed {:?}", id);
                true
            }
            None => false,
        }
    }

    /// Whether a message is still waiting for delivery
    pub fn is_pending(&self, id: MessageId) -> bool {
        self.inner.borrow().messages.contains_key(id)
    }

    /// Number of messages waiting for delivery
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().messages.len()
    }

    /// Due time of the next pending message
    pub fn next_due(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .queue
            .first_key_value()
            .map(|(key, _)| key.0)
    }

    /// Deliver every message that is already due without moving the clock
    pub fn run_pending(&self) -> usize {
        let now = self.now();
        self.advance_to(now)
    }

    /// Move the clock forward by `delta`, delivering due messages in order
    ///
    /// Returns the number of messages delivered.
    pub fn advance_by(&self, delta: Duration) -> usize {
        let deadline = self.now() + delta;
        self.advance_to(deadline)
    }

    /// Move the clock forward to `deadline`, delivering due messages in order
    ///
    /// The clock never moves backwards; a deadline in the past only delivers
    /// messages that are already due.
    pub fn advance_to(&self, deadline: Duration) -> usize {
        let mut delivered = 0;
        loop {
            // The borrow must end before the callback runs: callbacks post and
            // remove messages on this same looper.
            let next = self.inner.borrow_mut().pop_due(deadline);
            match next {
                Some(callback) => {
                    callback();
                    delivered += 1;
                }
                None => break,
            }
        }

        let mut inner = self.inner.borrow_mut();
        if deadline > inner.now {
            inner.now = deadline;
        }
        delivered
    }

    /// Stop accepting messages and drop everything still queued
    pub fn quit(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.quit = true;
        inner.queue.clear();
        inner.messages.clear();
        tracing::debug!("looper: quit");
    }

    /// Whether [`Looper::quit`] has been called
    pub fn has_quit(&self) -> bool {
        self.inner.borrow().quit
    }
}

impl Default for Looper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Looper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Looper")
            .field("now", &inner.now)
            .field("pending", &inner.messages.len())
            .field("quit", &inner.quit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_delivery_order_by_due_then_post_order() {
        let looper = Looper::new();
        let log = recorder();

        for (delay, name) in [(3, "c"), (1, "a"), (3, "d"), (2, "b")] {
            let log = Rc::clone(&log);
            looper
                .post_delayed(Duration::from_millis(delay), move || {
                    log.borrow_mut().push(name)
                })
                .unwrap();
        }

        assert_eq!(looper.advance_by(Duration::from_millis(10)), 4);
        assert_eq!(*log.borrow(), vec!["a", "b", "c", "d"]);
        assert_eq!(looper.now(), Duration::from_millis(10));
    }

    #[test]
    fn test_not_delivered_before_due() {
        let looper = Looper::new();
        let log = recorder();
        let sink = Rc::clone(&log);
        looper
            .post_delayed(Duration::from_secs(5), move || sink.borrow_mut().push("tick"))
            .unwrap();

        assert_eq!(looper.advance_by(Duration::from_millis(4_999)), 0);
        assert!(log.borrow().is_empty());
        assert_eq!(looper.advance_by(Duration::from_millis(1)), 1);
        assert_eq!(*log.borrow(), vec!["tick"]);
    }

    #[test]
    fn test_remove_cancels_delivery() {
        let looper = Looper::new();
        let log = recorder();
        let sink = Rc::clone(&log);
        let id = looper
            .post_delayed(Duration::from_secs(1), move || sink.borrow_mut().push("tick"))
            .unwrap();

        assert!(looper.remove(id));
        assert!(!looper.remove(id));
        assert!(!looper.is_pending(id));
        assert_eq!(looper.next_due(), None);

        looper.advance_by(Duration::from_secs(2));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_stale_handle_does_not_match_new_message() {
        let looper = Looper::new();
        let first = looper.post(|| {}).unwrap();
        looper.run_pending();

        let second = looper.post(|| {}).unwrap();
        assert_ne!(first, second);
        assert!(!looper.is_pending(first));
        assert!(!looper.remove(first));
        assert!(looper.is_pending(second));
    }

    #[test]
    fn test_rearming_callback_within_one_advance() {
        fn arm(looper: &Looper, count: Rc<RefCell<u32>>) {
            let again = looper.clone();
            looper
                .post_delayed(Duration::from_secs(1), move || {
                    *count.borrow_mut() += 1;
                    arm(&again, count);
                })
                .unwrap();
        }

        let looper = Looper::new();
        let count = Rc::new(RefCell::new(0));
        arm(&looper, Rc::clone(&count));

        assert_eq!(looper.advance_by(Duration::from_secs(3)), 3);
        assert_eq!(*count.borrow(), 3);
        assert_eq!(looper.pending_count(), 1);
        assert_eq!(looper.next_due(), Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_quit_drops_queue_and_rejects_posts() {
        let looper = Looper::new();
        looper.post_delayed(Duration::from_secs(1), || {}).unwrap();
        looper.quit();

        assert!(looper.has_quit());
        assert_eq!(looper.pending_count(), 0);
        assert_eq!(looper.post(|| {}), Err(PlatformError::LooperQuit));
    }
}
