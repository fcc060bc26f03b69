//! Click-sequence counter for the central's single button.
//!
//! ## Sequence detection
//!
//! | State      | Event            | Next        | Output                  |
//! |------------|------------------|-------------|-------------------------|
//! | `Idle`     | press            | `Counting`  | window armed            |
//! | `Counting` | press, n < max   | `Counting`  | window restarted        |
//! | `Counting` | press, n = max   | `Idle`      | [`ClickVerdict::TooMany`] |
//! | `Counting` | window expires   | `Idle`      | [`ClickVerdict::Complete`] |
//!
//! The window is an inactivity timeout: every press pushes it back.

use log::{debug, info};

use crate::scheduler::{Millis, Schedule, ScheduleKind};

/// Internal state machine for sequence detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickState {
    Idle,
    Counting { count: u8 },
}

/// Result of a closed click sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickVerdict {
    /// The window closed after `n` clicks.
    Complete(u8),
    /// More clicks than any command needs; the sequence was discarded.
    TooMany,
}

pub struct ClickCounter {
    state: ClickState,
    window: Option<Schedule>,
    window_ms: u32,
    max_clicks: u8,
}

impl ClickCounter {
    pub fn new(window_ms: u32, max_clicks: u8) -> Self {
        Self {
            state: ClickState::Idle,
            window: None,
            window_ms,
            max_clicks,
        }
    }

    pub fn state(&self) -> ClickState {
        self.state
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.window.as_ref().and_then(Schedule::next_deadline)
    }

    /// Register a button press at `now`.
    pub fn press(&mut self, now: Millis) -> Option<ClickVerdict> {
        match self.state {
            ClickState::Idle => {
                self.state = ClickState::Counting { count: 1 };
                self.window = Some(Schedule::start(
                    "click-window",
                    ScheduleKind::OneShot {
                        delay_ms: self.window_ms,
                    },
                    now,
                ));
                debug!("click: sequence started");
                None
            }
            ClickState::Counting { count } => {
                let count = count.saturating_add(1);
                if count > self.max_clicks {
                    info!("click: {} clicks, sequence discarded", count);
                    self.state = ClickState::Idle;
                    self.window = None;
                    return Some(ClickVerdict::TooMany);
                }
                self.state = ClickState::Counting { count };
                if let Some(window) = self.window.as_mut() {
                    window.restart(now);
                }
                debug!("click: {} clicks", count);
                None
            }
        }
    }

    /// Close the sequence once the window has expired.
    pub fn poll(&mut self, now: Millis) -> Option<ClickVerdict> {
        let ClickState::Counting { count } = self.state else {
            return None;
        };
        self.window.as_mut()?.poll(now)?;
        self.state = ClickState::Idle;
        self.window = None;
        info!("click: sequence closed with {} clicks", count);
        Some(ClickVerdict::Complete(count))
    }
}
