//! Discrete-event scheduler keyed by a monotonic 64-bit tick counter.
//!
//! Each logical source owns at most one pending event. Events fire in due-tick
//! order, with ties resolved by the order they were scheduled in.

use log::trace;

/// Callback run when an event fires: `(context, scheduler, lateness)`.
///
/// `lateness` is how many ticks past its due tick the event was popped.
pub type EventCallback<C> = fn(&mut C, &mut Scheduler<C>, u64);

/// Logical owner of a pending event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum EventSource {
    /// Scanline timing.
    Video,
    /// Host-defined source.
    Host(u16),
}

/// A pending or just-popped event.
pub struct ScheduledEvent<C> {
    source: EventSource,
    due: u64,
    sequence: u64,
    callback: EventCallback<C>,
}

impl<C> Clone for ScheduledEvent<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ScheduledEvent<C> {}

impl<C> std::fmt::Debug for ScheduledEvent<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("source", &self.source)
            .field("due", &self.due)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl<C> ScheduledEvent<C> {
    /// Owner of the event.
    #[must_use]
    pub const fn source(&self) -> EventSource {
        self.source
    }

    /// Absolute tick the event is due at.
    #[must_use]
    pub const fn due(&self) -> u64 {
        self.due
    }

    const fn order_key(&self) -> (u64, u64) {
        (self.due, self.sequence)
    }

    /// Runs the callback with the lateness measured against `scheduler.now()`.
    ///
    /// Returns that lateness.
    pub fn fire(self, context: &mut C, scheduler: &mut Scheduler<C>) -> u64 {
        let lateness = scheduler.now().saturating_sub(self.due);
        trace!(
            "event {:?} due {} fired at {} (late {lateness})",
            self.source,
            self.due,
            scheduler.now()
        );
        (self.callback)(context, scheduler, lateness);
        lateness
    }
}

/// Time-ordered queue of pending events plus the current tick.
pub struct Scheduler<C> {
    now: u64,
    next_sequence: u64,
    /// Sorted ascending by `(due, sequence)`.
    pending: Vec<ScheduledEvent<C>>,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<C> Scheduler<C> {
    /// Creates an empty scheduler at tick zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: 0,
            next_sequence: 0,
            pending: Vec::new(),
        }
    }

    /// Current tick.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Moves the clock forward without firing anything.
    pub fn advance(&mut self, ticks: u64) {
        self.now = self.now.saturating_add(ticks);
    }

    /// Schedules `callback` for `source` at `now + delta`.
    ///
    /// Any event already pending for `source` is discarded.
    pub fn schedule_relative(
        &mut self,
        source: EventSource,
        delta: u64,
        callback: EventCallback<C>,
    ) {
        self.pending.retain(|event| event.source != source);
        let event = ScheduledEvent {
            source,
            due: self.now.saturating_add(delta),
            sequence: self.next_sequence,
            callback,
        };
        self.next_sequence += 1;
        let key = event.order_key();
        let index = self
            .pending
            .partition_point(|pending| pending.order_key() <= key);
        self.pending.insert(index, event);
    }

    /// Removes and returns the earliest event if it is due.
    pub fn pop_due_event(&mut self) -> Option<ScheduledEvent<C>> {
        match self.pending.first() {
            Some(event) if event.due <= self.now => Some(self.pending.remove(0)),
            _ => None,
        }
    }

    /// Fires every due event in order, including ones scheduled by callbacks
    /// that are already due. Returns how many fired.
    pub fn drain(&mut self, context: &mut C) -> usize {
        let mut fired = 0;
        while let Some(event) = self.pop_due_event() {
            event.fire(context, self);
            fired += 1;
        }
        fired
    }

    /// Whether `source` has a pending event.
    #[must_use]
    pub fn is_pending(&self, source: EventSource) -> bool {
        self.pending.iter().any(|event| event.source == source)
    }

    /// Due tick of the pending event for `source`.
    #[must_use]
    pub fn due_tick(&self, source: EventSource) -> Option<u64> {
        self.pending
            .iter()
            .find(|event| event.source == source)
            .map(|event| event.due)
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Ticks until the earliest pending event is due; zero if already due.
    #[must_use]
    pub fn ticks_until_next(&self) -> Option<u64> {
        self.pending
            .first()
            .map(|event| event.due.saturating_sub(self.now))
    }
}
