//! Timer system for Gridline.
//!
//! Provides one-shot and repeating timers driven by an explicit clock. The
//! owner asks [`TimerManager::process_expired`] which timers are due and
//! dispatches them itself; nothing fires behind its back.
//!
//! Cancelling is idempotent: [`TimerManager::cancel`] on a timer that already
//! fired or was never armed is a no-op. [`TimerManager::reschedule`] is strict
//! and reports unknown IDs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, TimerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// The type of timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once after the specified duration.
    OneShot,
    /// Fires repeatedly at the specified interval.
    Repeating,
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer should next fire.
    next_fire: Instant,
    /// The interval for repeating timers.
    interval: Duration,
    /// The kind of timer.
    kind: TimerKind,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages a set of timers.
#[derive(Debug)]
pub struct TimerManager {
    /// All armed timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending fires. Entries whose fire time no longer
    /// matches the timer (rescheduled or removed) are stale and skipped.
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    pub fn start_one_shot(&mut self, now: Instant, duration: Duration) -> TimerId {
        self.insert(now, duration, duration, TimerKind::OneShot)
    }

    /// Start a repeating timer whose first fire is `delay` after `now`;
    /// later fires follow every `interval`.
    pub fn start_delayed_repeating(
        &mut self,
        now: Instant,
        delay: Duration,
        interval: Duration,
    ) -> TimerId {
        self.insert(now, delay, interval, TimerKind::Repeating)
    }

    fn insert(
        &mut self,
        now: Instant,
        first: Duration,
        interval: Duration,
        kind: TimerKind,
    ) -> TimerId {
        let next_fire = now + first;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
            kind,
        });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });
        tracing::trace!(target: targets::TIMER, ?id, ?kind, ?interval, "timer armed");
        id
    }

    /// Push an armed timer's next fire to `delay` after `now`.
    ///
    /// Fails if the timer is unknown, which includes one-shot timers that
    /// have already fired.
    pub fn reschedule(&mut self, id: TimerId, now: Instant, delay: Duration) -> Result<()> {
        let timer = self.timers.get_mut(id).ok_or(TimerError::InvalidTimerId)?;
        timer.next_fire = now + delay;
        if timer.kind == TimerKind::OneShot {
            timer.interval = delay;
        }
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: timer.next_fire,
        });
        Ok(())
    }

    /// Cancel a timer if it is armed.
    ///
    /// Returns whether anything was cancelled. Cancelling a timer that is not
    /// pending is not an error.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let removed = self.timers.remove(id).is_some();
        if removed {
            tracing::trace!(target: targets::TIMER, ?id, "timer cancelled");
        }
        removed
    }

    /// Check if a timer is currently armed.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the duration from `now` until the next timer fires, if any.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        self.discard_stale();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Drop stale entries from the front of the queue.
    fn discard_stale(&mut self) {
        while let Some(entry) = self.queue.peek() {
            let live = self
                .timers
                .get(entry.id)
                .is_some_and(|t| t.next_fire == entry.fire_time);
            if live {
                break;
            }
            self.queue.pop();
        }
    }

    /// Collect all timers due at `now`, in firing order.
    ///
    /// One-shot timers are removed once returned; repeating timers are
    /// re-armed one interval after `now`.
    #[tracing::instrument(skip(self), target = "gridline_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();
        // Re-armed entries join the queue afterwards so a zero interval fires
        // once per call.
        let mut rearmed = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            let Some(timer) = self.timers.get_mut(entry.id) else {
                continue;
            };
            if timer.next_fire != entry.fire_time {
                continue;
            }

            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            fired.push(entry.id);

            match timer.kind {
                TimerKind::OneShot => {
                    self.timers.remove(entry.id);
                }
                TimerKind::Repeating => {
                    timer.next_fire = now + timer.interval;
                    rearmed.push(TimerQueueEntry {
                        id: entry.id,
                        fire_time: timer.next_fire,
                    });
                }
            }
        }

        self.queue.extend(rearmed);
        fired
    }

    /// Get the number of armed timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let t0 = Instant::now();
        let id = timers.start_one_shot(t0, ms(100));

        assert!(timers.process_expired(t0 + ms(99)).is_empty());
        assert_eq!(timers.process_expired(t0 + ms(100)), vec![id]);
        assert!(!timers.is_active(id));
        assert!(timers.process_expired(t0 + ms(500)).is_empty());
    }

    #[test]
    fn test_repeating_rearms() {
        let mut timers = TimerManager::new();
        let t0 = Instant::now();
        let id = timers.start_delayed_repeating(t0, ms(35), ms(35));

        assert_eq!(timers.process_expired(t0 + ms(35)), vec![id]);
        assert_eq!(timers.process_expired(t0 + ms(70)), vec![id]);
        assert!(timers.is_active(id));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timers = TimerManager::new();
        let t0 = Instant::now();
        let id = timers.start_one_shot(t0, ms(10));

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.process_expired(t0 + ms(10)).is_empty());
    }

    #[test]
    fn test_reschedule_cancelled_timer_is_error() {
        let mut timers = TimerManager::new();
        let t0 = Instant::now();
        let id = timers.start_one_shot(t0, ms(10));
        timers.cancel(id);

        assert_eq!(
            timers.reschedule(id, t0, ms(10)),
            Err(crate::CoreError::Timer(TimerError::InvalidTimerId))
        );
    }

    #[test]
    fn test_reschedule_moves_fire_time() {
        let mut timers = TimerManager::new();
        let t0 = Instant::now();
        let id = timers.start_one_shot(t0, ms(100));

        timers.reschedule(id, t0 + ms(50), ms(100)).unwrap();
        assert!(timers.process_expired(t0 + ms(100)).is_empty());
        assert_eq!(timers.process_expired(t0 + ms(150)), vec![id]);
    }

    #[test]
    fn test_reschedule_fired_one_shot_fails() {
        let mut timers = TimerManager::new();
        let t0 = Instant::now();
        let id = timers.start_one_shot(t0, ms(10));
        timers.process_expired(t0 + ms(10));

        assert!(timers.reschedule(id, t0 + ms(10), ms(10)).is_err());
    }

    #[test]
    fn test_fire_order_and_time_until_next() {
        let mut timers = TimerManager::new();
        let t0 = Instant::now();
        let late = timers.start_one_shot(t0, ms(30));
        let early = timers.start_one_shot(t0, ms(10));

        assert_eq!(timers.time_until_next(t0), Some(ms(10)));
        assert_eq!(timers.process_expired(t0 + ms(30)), vec![early, late]);
        assert_eq!(timers.time_until_next(t0), None);
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_delayed_repeating_uses_delay_then_interval() {
        let mut timers = TimerManager::new();
        let t0 = Instant::now();
        let id = timers.start_delayed_repeating(t0, ms(250), ms(35));

        assert!(timers.process_expired(t0 + ms(35)).is_empty());
        assert_eq!(timers.process_expired(t0 + ms(250)), vec![id]);
        assert!(timers.process_expired(t0 + ms(280)).is_empty());
        assert_eq!(timers.process_expired(t0 + ms(285)), vec![id]);
        assert!(timers.cancel(id));
    }

    #[test]
    fn test_zero_interval_fires_once_per_call() {
        let mut timers = TimerManager::new();
        let t0 = Instant::now();
        let id = timers.start_delayed_repeating(t0, Duration::ZERO, Duration::ZERO);
        assert_eq!(timers.process_expired(t0), vec![id]);
        assert_eq!(timers.process_expired(t0), vec![id]);
        assert_eq!(timers.time_until_next(t0), Some(Duration::ZERO));
    }
}
