//! Bathroom humidity automation.
//!
//! ```text
//!   button ──▶ shower on/off
//!                 │ every 3 s: +1..=6 %
//!                 ▼
//!   humidity ──▶ > lower (35) ─▶ LOWER_EXCEEDED, green
//!            ──▶ > upper (60) ─▶ UPPER_EXCEEDED, VENTILATION_ACTIVE, red + blue
//!                                   │ every 3 s: -7 %
//!                                   ▼
//!            ──▶ < upper ─▶ red off
//!            ──▶ < lower ─▶ ventilation off, green + blue off
//! ```
//!
//! The bathroom has no radio.  Both thresholds are evaluated on every
//! change, so one step past both fires both crossings.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::config::BathroomConfig;
use crate::drivers::leds::Led;
use crate::events::Mailbox;
use crate::nodes::helpers::{Shower, Ventilation};
use crate::nodes::station::{Node, NodeIo};
use crate::nodes::status::{BathroomFlag, StatusWord};
use crate::scheduler::{Millis, earliest};
use crate::sensors::threshold::{Crossing, EdgeDetector};
use crate::transport::NodeId;
use crate::transport::link::SendOutcome;
use crate::transport::radio::Channels;
use crate::transport::wire::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BathroomEvent {
    Button,
    /// Shower helper raised humidity by this many points.
    Increase(u8),
    /// Ventilation helper lowered humidity by this many points.
    Decrease(u8),
}

pub struct Bathroom {
    config: BathroomConfig,
    status: StatusWord<BathroomFlag>,
    /// Current humidity; 0 means "not sampled yet".
    humidity: u8,
    lower: EdgeDetector,
    upper: EdgeDetector,
    shower: Option<Shower>,
    ventilation: Option<Ventilation>,
}

impl Bathroom {
    pub fn new(config: &BathroomConfig) -> Self {
        Self {
            config: *config,
            status: StatusWord::new(),
            humidity: 0,
            lower: EdgeDetector::new(i32::from(config.lower_threshold)),
            upper: EdgeDetector::new(i32::from(config.upper_threshold)),
            shower: None,
            ventilation: None,
        }
    }

    pub fn status(&self) -> StatusWord<BathroomFlag> {
        self.status
    }

    pub fn humidity(&self) -> u8 {
        self.humidity
    }

    pub fn is_showering(&self) -> bool {
        self.shower.is_some()
    }

    pub fn is_ventilating(&self) -> bool {
        self.ventilation.is_some()
    }

    fn on_button(&mut self, io: &mut NodeIo<'_>) {
        if self.status.insert(BathroomFlag::ShowerActive) {
            info!("bathroom: shower on");
            self.shower = Some(Shower::start(
                io.now,
                self.config.step_ms,
                self.config.max_increase,
            ));
            io.emit(AppEvent::ShowerChanged(true));
            return;
        }

        self.status.remove(BathroomFlag::ShowerActive);
        self.shower = None;
        info!("bathroom: shower off");
        // Below the lower threshold the reading is stale by next shower.
        if !self.status.contains(BathroomFlag::LowerExceeded) {
            self.humidity = 0;
        }
        io.emit(AppEvent::ShowerChanged(false));
    }

    fn on_increase(&mut self, step: u8, io: &mut NodeIo<'_>) {
        if !self.status.contains(BathroomFlag::ShowerActive) {
            debug!("bathroom: increase after shower off ignored");
            return;
        }
        if self.humidity == 0 {
            self.humidity = io.sensors.sample_humidity();
        }
        self.humidity = self.humidity.saturating_add(step).min(100);
        io.emit(AppEvent::HumidityChanged(self.humidity));

        let value = i32::from(self.humidity);
        if self.lower.update(value) == Some(Crossing::Rising) {
            info!("bathroom: humidity {}% above lower threshold", self.humidity);
            self.status.insert(BathroomFlag::LowerExceeded);
            io.leds.set_indicator(Led::Green, true);
        }
        if self.upper.update(value) == Some(Crossing::Rising) {
            info!(
                "bathroom: humidity {}% above upper threshold, ventilating",
                self.humidity
            );
            self.status.insert(BathroomFlag::UpperExceeded);
            io.leds.set_indicator(Led::Red, true);
            io.leds.set_indicator(Led::Blue, true);
            // A ventilation already running keeps its phase.
            if self.ventilation.is_none() {
                self.ventilation = Some(Ventilation::start(
                    io.now,
                    self.config.step_ms,
                    self.config.ventilation_decrease,
                ));
            }
            if self.status.insert(BathroomFlag::VentilationActive) {
                io.emit(AppEvent::VentilationChanged(true));
            }
        }
    }

    fn on_decrease(&mut self, step: u8, io: &mut NodeIo<'_>) {
        if !self.status.contains(BathroomFlag::VentilationActive) {
            debug!("bathroom: decrease after ventilation off ignored");
            return;
        }
        self.humidity = self.humidity.saturating_sub(step);
        io.emit(AppEvent::HumidityChanged(self.humidity));

        let value = i32::from(self.humidity);
        if self.upper.update(value) == Some(Crossing::Falling) {
            info!("bathroom: humidity {}% below upper threshold", self.humidity);
            self.status.remove(BathroomFlag::UpperExceeded);
            io.leds.set_indicator(Led::Red, false);
        }
        if self.lower.update(value) == Some(Crossing::Falling) {
            info!(
                "bathroom: humidity {}% below lower threshold, ventilation off",
                self.humidity
            );
            self.status.remove(BathroomFlag::LowerExceeded);
            self.status.remove(BathroomFlag::VentilationActive);
            self.ventilation = None;
            io.leds.set_indicator(Led::Green, false);
            io.leds.set_indicator(Led::Blue, false);
            io.emit(AppEvent::VentilationChanged(false));
        }
    }
}

impl Node for Bathroom {
    type Event = BathroomEvent;

    fn id(&self) -> NodeId {
        NodeId::Bathroom
    }

    fn channels(&self) -> Channels {
        Channels::NONE
    }

    fn start(&mut self, io: &mut NodeIo<'_>) {
        io.leds.set_all(false);
    }

    fn next_deadline(&self) -> Option<Millis> {
        earliest([
            self.shower.as_ref().and_then(Shower::next_deadline),
            self.ventilation.as_ref().and_then(Ventilation::next_deadline),
        ])
    }

    fn on_timer(&mut self, io: &mut NodeIo<'_>, mailbox: &Mailbox<BathroomEvent>) {
        let now = io.now;
        if let Some(shower) = self.shower.as_mut() {
            while let Some(step) = shower.poll(now, io.entropy) {
                mailbox.post(BathroomEvent::Increase(step));
            }
        }
        if let Some(ventilation) = self.ventilation.as_mut() {
            while let Some(step) = ventilation.poll(now) {
                mailbox.post(BathroomEvent::Decrease(step));
            }
        }
    }

    fn on_button(&mut self, _io: &mut NodeIo<'_>, mailbox: &Mailbox<BathroomEvent>) {
        mailbox.post(BathroomEvent::Button);
    }

    fn on_message(&mut self, from: NodeId, message: Message) -> Option<BathroomEvent> {
        debug!("bathroom: {} from {} ignored", message, from.name());
        None
    }

    fn on_send_outcome(&mut self, _outcome: SendOutcome) -> Option<BathroomEvent> {
        None
    }

    fn handle(&mut self, event: BathroomEvent, io: &mut NodeIo<'_>) {
        match event {
            BathroomEvent::Button => self.on_button(io),
            BathroomEvent::Increase(step) => self.on_increase(step, io),
            BathroomEvent::Decrease(step) => self.on_decrease(step, io),
        }
    }
}
