//! Cancelable timers driven by the frame clock
//!
//! Timers never run code themselves. When the frame clock passes a deadline the
//! timer's event becomes due, and the state machine pops due events one at a
//! time at the start of each frame. Popping one at a time means a handler that
//! cancels another timer takes effect before that timer can be delivered.

use serde::{Deserialize, Serialize};

use super::state::{PickupId, Side};

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// One countdown step elapsed
    CountdownTick,
    /// Take the "GO!" banner down
    HideGoBanner,
    /// Try to place a pickup
    SpawnPickup,
    /// An active pickup ran out
    ExpirePickup(PickupId),
    /// Paddle color goes back to normal after a hit
    FlashRevert(Side),
    /// Pickup-collected message times out
    HidePickupMessage,
}

#[derive(Debug, Clone)]
struct Timer {
    handle: TimerHandle,
    deadline: f64,
    period: Option<f64>,
    event: TimerEvent,
}

/// All pending timers of one game session
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&mut self) -> TimerHandle {
        self.next_id += 1;
        TimerHandle(self.next_id)
    }

    /// Fire `event` once, `delay_ms` after `now`
    pub fn schedule(&mut self, now: f64, delay_ms: f64, event: TimerEvent) -> TimerHandle {
        let handle = self.next_handle();
        self.timers.push(Timer {
            handle,
            deadline: now + delay_ms.max(0.0),
            period: None,
            event,
        });
        handle
    }

    /// Fire `event` every `period_ms`, first time one period after `now`
    pub fn schedule_interval(&mut self, now: f64, period_ms: f64, event: TimerEvent) -> TimerHandle {
        debug_assert!(period_ms > 0.0, "interval period must be positive");
        let handle = self.next_handle();
        self.timers.push(Timer {
            handle,
            deadline: now + period_ms,
            period: Some(period_ms),
            event,
        });
        handle
    }

    /// Cancel a timer. Returns false if it already fired or was canceled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Cancel a timer and return how long it still had to run
    pub fn suspend(&mut self, handle: TimerHandle, now: f64) -> Option<f64> {
        let remaining = self.remaining(handle, now)?;
        self.cancel(handle);
        Some(remaining)
    }

    /// Time left before the timer fires (zero if already due)
    pub fn remaining(&self, handle: TimerHandle, now: f64) -> Option<f64> {
        self.deadline(handle).map(|d| (d - now).max(0.0))
    }

    pub fn deadline(&self, handle: TimerHandle) -> Option<f64> {
        self.timers
            .iter()
            .find(|t| t.handle == handle)
            .map(|t| t.deadline)
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Pop the earliest event whose deadline is at or before `now`.
    ///
    /// One-shot timers are removed; intervals re-arm one period later, or one
    /// period after `now` if they fell more than a period behind.
    pub fn pop_due(&mut self, now: f64) -> Option<TimerEvent> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by(|(_, a), (_, b)| {
                a.deadline
                    .partial_cmp(&b.deadline)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.handle.cmp(&b.handle))
            })
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[idx];
        let event = timer.event;
        match timer.period {
            Some(period) => {
                let next = timer.deadline + period;
                timer.deadline = if next <= now { now + period } else { next };
            }
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(event)
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Number of pending timers carrying a matching event
    pub fn count_matching(&self, pred: impl Fn(&TimerEvent) -> bool) -> usize {
        self.timers.iter().filter(|t| pred(&t.event)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut TimerQueue, now: f64) -> Vec<TimerEvent> {
        std::iter::from_fn(|| queue.pop_due(now)).collect()
    }

    #[test]
    fn test_one_shot_fires_once_at_deadline() {
        let mut q = TimerQueue::new();
        q.schedule(0.0, 100.0, TimerEvent::HidePickupMessage);

        assert!(drain(&mut q, 99.0).is_empty());
        assert_eq!(drain(&mut q, 100.0), vec![TimerEvent::HidePickupMessage]);
        assert!(drain(&mut q, 500.0).is_empty());
        assert!(q.is_empty());
    }

    #[test]
    fn test_events_come_out_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(0.0, 300.0, TimerEvent::HideGoBanner);
        q.schedule(0.0, 100.0, TimerEvent::FlashRevert(Side::Player));
        q.schedule(0.0, 200.0, TimerEvent::CountdownTick);

        assert_eq!(
            drain(&mut q, 1000.0),
            vec![
                TimerEvent::FlashRevert(Side::Player),
                TimerEvent::CountdownTick,
                TimerEvent::HideGoBanner,
            ]
        );
    }

    #[test]
    fn test_cancel_prevents_delivery() {
        let mut q = TimerQueue::new();
        let h = q.schedule(0.0, 50.0, TimerEvent::ExpirePickup(PickupId(1)));
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        assert!(drain(&mut q, 100.0).is_empty());
    }

    #[test]
    fn test_cancel_between_pops_takes_effect() {
        let mut q = TimerQueue::new();
        q.schedule(0.0, 10.0, TimerEvent::CountdownTick);
        let later = q.schedule(0.0, 20.0, TimerEvent::SpawnPickup);

        assert_eq!(q.pop_due(100.0), Some(TimerEvent::CountdownTick));
        q.cancel(later);
        assert_eq!(q.pop_due(100.0), None);
    }

    #[test]
    fn test_interval_rearms() {
        let mut q = TimerQueue::new();
        let h = q.schedule_interval(0.0, 1000.0, TimerEvent::SpawnPickup);

        assert!(drain(&mut q, 999.0).is_empty());
        assert_eq!(drain(&mut q, 1000.0), vec![TimerEvent::SpawnPickup]);
        assert_eq!(q.deadline(h), Some(2000.0));
        assert_eq!(drain(&mut q, 2500.0), vec![TimerEvent::SpawnPickup]);
        assert_eq!(q.deadline(h), Some(3000.0));
    }

    #[test]
    fn test_interval_skips_missed_periods() {
        let mut q = TimerQueue::new();
        let h = q.schedule_interval(0.0, 1000.0, TimerEvent::SpawnPickup);

        // Tab was hidden for ten periods: one attempt, not ten
        assert_eq!(drain(&mut q, 10_500.0), vec![TimerEvent::SpawnPickup]);
        assert_eq!(q.deadline(h), Some(11_500.0));
    }

    #[test]
    fn test_suspend_reports_remaining() {
        let mut q = TimerQueue::new();
        let h = q.schedule(1000.0, 5000.0, TimerEvent::ExpirePickup(PickupId(3)));

        assert_eq!(q.remaining(h, 3000.0), Some(3000.0));
        assert_eq!(q.suspend(h, 3000.0), Some(3000.0));
        assert!(!q.is_scheduled(h));
        assert_eq!(q.suspend(h, 3000.0), None);
    }
}
