//! Virtual time. The host event loop is modelled as a monotonic millisecond
//! clock plus a queue of timed continuations.

/// Monotonic virtual clock in milliseconds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    now_ms: u64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Moves the clock forward to `at_ms`. Earlier instants are ignored.
    pub fn advance_to(&mut self, at_ms: u64) {
        self.now_ms = self.now_ms.max(at_ms);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent<T> {
    pub at_ms: u64,
    pub payload: T,
}

/// Time-ordered queue of continuations. Events due at the same instant fire
/// in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    events: Vec<ScheduledEvent<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at_ms: u64, payload: T) {
        let index = self.events.partition_point(|event| event.at_ms <= at_ms);
        self.events.insert(index, ScheduledEvent { at_ms, payload });
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.events.first().map(|event| event.at_ms)
    }

    /// Pops the earliest event if it is due at `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<ScheduledEvent<T>> {
        match self.events.first() {
            Some(event) if event.at_ms <= now_ms => Some(self.events.remove(0)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
