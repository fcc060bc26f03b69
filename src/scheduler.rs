//! Timer/scheduler engine.
//!
//! Helper routines on every node are driven by [`Schedule`]s running on the
//! network's virtual millisecond clock.  A schedule never posts anything by
//! itself: the owner polls it when the clock reaches
//! [`Schedule::next_deadline`] and turns each [`Fire`] into a mailbox event.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Schedule kinds                           │
//! │                                                              │
//! │  ┌────────────┐     ┌────────────┐     ┌────────────┐        │
//! │  │ Periodic   │     │ Budgeted   │     │ One-Shot   │        │
//! │  │ blink,     │     │ opening    │     │ click      │        │
//! │  │ sampling   │     │ sequence   │     │ window,    │        │
//! │  │            │     │            │     │ camera     │        │
//! │  └─────┬──────┘     └─────┬──────┘     └─────┬──────┘        │
//! │        │                  │                  │               │
//! │        ▼                  ▼                  ▼               │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │        helper state machine (nodes::helpers)           │  │
//! │  │        posts events into the node's mailbox            │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use log::debug;

/// Virtual time in milliseconds since the network started.
pub type Millis = u64;

// ═══════════════════════════════════════════════════════════════
//  Timer
// ═══════════════════════════════════════════════════════════════

/// Event timer: an optional deadline plus the interval it was armed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Timer {
    deadline: Option<Millis>,
    interval: Millis,
}

impl Timer {
    const fn idle() -> Self {
        Self {
            deadline: None,
            interval: 0,
        }
    }

    /// Arm the timer to expire `interval` from `now`.
    fn set(&mut self, now: Millis, interval: Millis) {
        self.interval = interval;
        self.deadline = Some(now + interval);
    }

    /// Re-arm relative to the previous deadline, so periodic use does not
    /// accumulate drift.
    fn reset(&mut self) {
        if let Some(deadline) = self.deadline {
            self.deadline = Some(deadline + self.interval);
        }
    }

    fn stop(&mut self) {
        self.deadline = None;
    }

    fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    fn expired(&self, now: Millis) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }
}

/// Earliest of a set of optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Millis>>) -> Option<Millis> {
    deadlines.into_iter().flatten().min()
}

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// The type of schedule determines how often it fires and when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    /// Fire every `interval_ms` until dropped.
    Periodic { interval_ms: u32 },
    /// Fire every `interval_ms`, `ticks` times, then finish.
    Budgeted { interval_ms: u32, ticks: u8 },
    /// Fire once after `delay_ms`, then finish.
    OneShot { delay_ms: u32 },
}

impl ScheduleKind {
    fn interval(self) -> Millis {
        match self {
            Self::Periodic { interval_ms } | Self::Budgeted { interval_ms, .. } => {
                Millis::from(interval_ms)
            }
            Self::OneShot { delay_ms } => Millis::from(delay_ms),
        }
    }
}

/// One expiry of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fire {
    /// 1-based count of fires since the schedule started.
    pub tick: u32,
    /// No further fires will follow.
    pub last: bool,
}

/// A running schedule.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Human-readable label used in logs (e.g. "alarm-blink").
    pub label: &'static str,
    kind: ScheduleKind,
    timer: Timer,
    fired: u32,
}

impl Schedule {
    /// Start the schedule; the first fire is one interval after `now`.
    pub fn start(label: &'static str, kind: ScheduleKind, now: Millis) -> Self {
        let mut timer = Timer::idle();
        timer.set(now, kind.interval());
        debug!("Scheduler: started '{}' ({:?})", label, kind);
        Self {
            label,
            kind,
            timer,
            fired: 0,
        }
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timer.deadline()
    }

    pub fn is_finished(&self) -> bool {
        !self.timer.is_armed()
    }

    /// Number of fires so far.
    #[cfg(test)]
    fn fired(&self) -> u32 {
        self.fired
    }

    /// Push the next expiry to one interval after `now`.
    pub fn restart(&mut self, now: Millis) {
        self.timer.set(now, self.kind.interval());
    }

    /// Report at most one expiry.  Call again while it returns `Some` to
    /// catch up after a long clock jump.
    pub fn poll(&mut self, now: Millis) -> Option<Fire> {
        if !self.timer.expired(now) {
            return None;
        }
        self.fired += 1;
        let last = match self.kind {
            ScheduleKind::Periodic { .. } => false,
            ScheduleKind::Budgeted { ticks, .. } => self.fired >= u32::from(ticks),
            ScheduleKind::OneShot { .. } => true,
        };
        if last {
            self.timer.stop();
            debug!("Scheduler: '{}' finished after {} fires", self.label, self.fired);
        } else {
            self.timer.reset();
        }
        Some(Fire {
            tick: self.fired,
            last,
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periodic_fires_at_interval() {
        let mut sched =
            Schedule::start("test-periodic", ScheduleKind::Periodic { interval_ms: 10 }, 0);

        assert_eq!(sched.poll(9), None);
        assert_eq!(sched.poll(10), Some(Fire { tick: 1, last: false }));
        assert_eq!(sched.poll(10), None);
        assert_eq!(sched.next_deadline(), Some(20));
    }

    #[test]
    fn periodic_does_not_drift_when_polled_late() {
        let mut sched = Schedule::start("late", ScheduleKind::Periodic { interval_ms: 100 }, 0);
        assert!(sched.poll(130).is_some());
        assert_eq!(sched.next_deadline(), Some(200));
    }

    #[test]
    fn catch_up_after_clock_jump() {
        let mut sched = Schedule::start("jump", ScheduleKind::Periodic { interval_ms: 5 }, 0);
        let mut fires = 0;
        while sched.poll(23).is_some() {
            fires += 1;
        }
        assert_eq!(fires, 4);
    }

    #[test]
    fn oneshot_fires_once() {
        let mut sched = Schedule::start("test-oneshot", ScheduleKind::OneShot { delay_ms: 5 }, 100);

        assert_eq!(sched.poll(104), None);
        assert_eq!(sched.poll(105), Some(Fire { tick: 1, last: true }));
        assert!(sched.is_finished());

        for t in 106..200 {
            assert_eq!(sched.poll(t), None);
        }
    }

    #[test]
    fn budgeted_stops_after_ticks() {
        let mut sched = Schedule::start(
            "test-budget",
            ScheduleKind::Budgeted {
                interval_ms: 2,
                ticks: 3,
            },
            0,
        );
        assert_eq!(sched.poll(2), Some(Fire { tick: 1, last: false }));
        assert_eq!(sched.poll(4), Some(Fire { tick: 2, last: false }));
        assert_eq!(sched.poll(6), Some(Fire { tick: 3, last: true }));
        assert!(sched.is_finished());
        assert_eq!(sched.poll(100), None);
        assert_eq!(sched.fired(), 3);
    }

    #[test]
    fn restart_pushes_deadline() {
        let mut sched = Schedule::start("window", ScheduleKind::OneShot { delay_ms: 4000 }, 0);
        sched.restart(3000);
        assert_eq!(sched.poll(4000), None);
        assert_eq!(sched.next_deadline(), Some(7000));
    }

    #[test]
    fn earliest_skips_idle_timers() {
        assert_eq!(earliest([None, Some(30), Some(10), None]), Some(10));
        assert_eq!(earliest([None, None]), None);
    }
}
