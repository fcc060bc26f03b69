//! Helper routines that run beside a node's primary routine.
//!
//! Each helper is a small state machine over a [`Schedule`].  The owning
//! node stores it as `Option<Helper>`: starting a helper builds it,
//! stopping one drops it.  Helpers never touch the status word; they only
//! report what happened and the node posts the matching event into its
//! own mailbox.
//!
//! | Helper          | Node        | Kind      | Reports                         |
//! |-----------------|-------------|-----------|---------------------------------|
//! | [`AlarmBlink`]  | gate, door  | periodic  | blink tick                      |
//! | [`OpeningBlink`]| gate, door  | budgeted  | blink tick `n`, then stop       |
//! | [`Sampler`]     | door, kitchen | periodic | sample due                     |
//! | [`Shower`]      | bathroom    | periodic  | humidity increase               |
//! | [`Ventilation`] | bathroom    | periodic  | humidity decrease               |
//! | [`Camera`]      | kitchen     | one-shot  | no fire / fire confirmed        |

use log::{debug, info};

use crate::app::ports::EntropyPort;
use crate::config::SatelliteConfig;
use crate::scheduler::{Millis, Schedule, ScheduleKind};

// ── Alarm blink ───────────────────────────────────────────────

/// Periodic blink while the alarm is active.
#[derive(Debug, Clone)]
pub struct AlarmBlink {
    schedule: Schedule,
}

impl AlarmBlink {
    pub fn start(now: Millis, period_ms: u32) -> Self {
        Self {
            schedule: Schedule::start(
                "alarm-blink",
                ScheduleKind::Periodic {
                    interval_ms: period_ms,
                },
                now,
            ),
        }
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.schedule.next_deadline()
    }

    /// `true` once per elapsed period.
    pub fn poll(&mut self, now: Millis) -> bool {
        self.schedule.poll(now).is_some()
    }
}

// ── Opening blink ─────────────────────────────────────────────

/// One tick of an automatic opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningStep {
    /// Tick number to blink on, if this tick blinks.
    pub blink: Option<u8>,
    /// The opening is over; the node must be told to stop.
    pub finished: bool,
}

/// Budgeted blink sequence of an automatic opening.
#[derive(Debug, Clone)]
pub struct OpeningBlink {
    schedule: Schedule,
    first_blink: u8,
}

impl OpeningBlink {
    pub fn start(now: Millis, config: &SatelliteConfig) -> Self {
        Self {
            schedule: Schedule::start(
                "opening-blink",
                ScheduleKind::Budgeted {
                    interval_ms: config.opening_tick_ms,
                    ticks: config.opening_ticks,
                },
                now,
            ),
            first_blink: config.first_blink_tick,
        }
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.schedule.next_deadline()
    }

    pub fn poll(&mut self, now: Millis) -> Option<OpeningStep> {
        let fire = self.schedule.poll(now)?;
        let tick = u8::try_from(fire.tick).unwrap_or(u8::MAX);
        Some(OpeningStep {
            blink: (tick >= self.first_blink).then_some(tick),
            finished: fire.last,
        })
    }
}

// ── Sampler ───────────────────────────────────────────────────

/// Periodic sensor sampling.
#[derive(Debug, Clone)]
pub struct Sampler {
    schedule: Schedule,
}

impl Sampler {
    pub fn start(label: &'static str, now: Millis, interval_ms: u32) -> Self {
        Self {
            schedule: Schedule::start(label, ScheduleKind::Periodic { interval_ms }, now),
        }
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.schedule.next_deadline()
    }

    pub fn poll(&mut self, now: Millis) -> bool {
        self.schedule.poll(now).is_some()
    }
}

// ── Shower ────────────────────────────────────────────────────

/// Raises humidity by a random step every period while the shower runs.
#[derive(Debug, Clone)]
pub struct Shower {
    schedule: Schedule,
    max_increase: u8,
}

impl Shower {
    pub fn start(now: Millis, step_ms: u32, max_increase: u8) -> Self {
        info!("bathroom: shower helper started");
        Self {
            schedule: Schedule::start(
                "shower",
                ScheduleKind::Periodic { interval_ms: step_ms },
                now,
            ),
            max_increase,
        }
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.schedule.next_deadline()
    }

    /// Step in `1..=max_increase + 1`, capped at 255.
    pub fn poll(&mut self, now: Millis, entropy: &mut dyn EntropyPort) -> Option<u8> {
        self.schedule.poll(now)?;
        let roll = entropy.below(u16::from(self.max_increase) + 1);
        let step = u8::try_from(roll.saturating_add(1)).unwrap_or(u8::MAX);
        debug!("shower: +{}", step);
        Some(step)
    }
}

// ── Ventilation ───────────────────────────────────────────────

/// Lowers humidity by a fixed step every period.
#[derive(Debug, Clone)]
pub struct Ventilation {
    schedule: Schedule,
    decrease: u8,
}

impl Ventilation {
    pub fn start(now: Millis, step_ms: u32, decrease: u8) -> Self {
        info!("bathroom: ventilation helper started");
        Self {
            schedule: Schedule::start(
                "ventilation",
                ScheduleKind::Periodic { interval_ms: step_ms },
                now,
            ),
            decrease,
        }
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.schedule.next_deadline()
    }

    pub fn poll(&mut self, now: Millis) -> Option<u8> {
        self.schedule.poll(now)?;
        Some(self.decrease)
    }
}

// ── Camera ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPhase {
    /// Camera on, waiting for a confirmation press or the window to close.
    Watching,
    /// Fire confirmed; waiting for the central to turn the camera off.
    AwaitingTermination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraVerdict {
    /// The window closed without a confirmation.
    NoFire,
    /// The button confirmed a fire within the window.
    FireConfirmed,
}

/// Fire confirmation window.
#[derive(Debug, Clone)]
pub struct Camera {
    phase: CameraPhase,
    window: Schedule,
}

impl Camera {
    pub fn start(now: Millis, window_ms: u32) -> Self {
        info!("kitchen: camera helper started");
        Self {
            phase: CameraPhase::Watching,
            window: Schedule::start("camera", ScheduleKind::OneShot { delay_ms: window_ms }, now),
        }
    }

    pub fn phase(&self) -> CameraPhase {
        self.phase
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        match self.phase {
            CameraPhase::Watching => self.window.next_deadline(),
            CameraPhase::AwaitingTermination => None,
        }
    }

    pub fn poll(&mut self, now: Millis) -> Option<CameraVerdict> {
        if self.phase != CameraPhase::Watching {
            return None;
        }
        self.window.poll(now)?;
        Some(CameraVerdict::NoFire)
    }

    pub fn on_button(&mut self) -> Option<CameraVerdict> {
        if self.phase != CameraPhase::Watching {
            return None;
        }
        self.phase = CameraPhase::AwaitingTermination;
        Some(CameraVerdict::FireConfirmed)
    }
}
