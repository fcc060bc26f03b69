//! Gate and door satellites.
//!
//! Both nodes run the same state machine over three flags and differ only
//! in what their [`Role`] adds:
//!
//! | Behaviour                  | Gate                    | Door                      |
//! |----------------------------|-------------------------|---------------------------|
//! | `UNLOCKED` means           | gate unlocked           | garden lights on          |
//! | changed by                 | `GateUnlock`/`GateLock` | local button              |
//! | `ReadSensor` answers       | `Light` (current)       | `Temperature` (mean of 5) |
//! | opening budget             | 8 ticks, all blink      | 15 ticks, blink from 7    |
//! | during opening             | shows temporary unlock  | blue only                 |
//! | opening stop               | restores lock LEDs      | blue off                  |
//!
//! Helper events may arrive after the state that justified them changed
//! (a blink queued just before the alarm went off); every handler
//! re-checks the status word and ignores stale events.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{IndicatorPort, SensorPort};
use crate::config::{DoorSamplerConfig, SatelliteConfig};
use crate::drivers::leds::Led;
use crate::events::Mailbox;
use crate::nodes::helpers::{AlarmBlink, OpeningBlink, Sampler};
use crate::nodes::station::{Node, NodeIo};
use crate::nodes::status::{SatelliteFlag, StatusWord};
use crate::scheduler::{Millis, earliest};
use crate::sensors::ring::RollingAverage;
use crate::transport::NodeId;
use crate::transport::link::SendOutcome;
use crate::transport::radio::Channels;
use crate::transport::wire::Message;

/// Samples kept by the door for its temperature mean.
pub const TEMPERATURE_WINDOW: usize = 5;

/// What distinguishes the gate from the door.
pub trait Role {
    const NODE: NodeId;
    /// Accepts `GateUnlock` / `GateLock` from the central.
    const LOCKABLE: bool;
    /// Has a local button that toggles `UNLOCKED`.
    const HAS_BUTTON: bool;

    /// Reply to a `ReadSensor` command.
    fn sensor_report(&mut self, sensors: &mut dyn SensorPort) -> Message;

    fn record_sample(&mut self, _celsius: i16) {}

    /// LED pattern for opening tick `tick`.
    fn show_opening_tick(&self, tick: u8, unlocked: bool, leds: &mut dyn IndicatorPort);

    /// LED pattern once the opening is over.
    fn finish_opening(&self, alarm: bool, unlocked: bool, leds: &mut dyn IndicatorPort);
}

#[derive(Debug, Default)]
pub struct Gate;

impl Role for Gate {
    const NODE: NodeId = NodeId::Gate;
    const LOCKABLE: bool = true;
    const HAS_BUTTON: bool = false;

    fn sensor_report(&mut self, sensors: &mut dyn SensorPort) -> Message {
        Message::Light(sensors.sample_light())
    }

    fn show_opening_tick(&self, tick: u8, unlocked: bool, leds: &mut dyn IndicatorPort) {
        if !unlocked {
            leds.set_indicator(Led::Green, true);
            leds.set_indicator(Led::Red, false);
        }
        leds.set_indicator(Led::Blue, tick % 2 != 0);
    }

    fn finish_opening(&self, alarm: bool, unlocked: bool, leds: &mut dyn IndicatorPort) {
        if !alarm && !unlocked {
            leds.set_indicator(Led::Green, false);
            leds.set_indicator(Led::Red, true);
        }
    }
}

#[derive(Debug, Default)]
pub struct Door {
    samples: RollingAverage<TEMPERATURE_WINDOW>,
}

impl Door {
    pub fn samples(&self) -> &RollingAverage<TEMPERATURE_WINDOW> {
        &self.samples
    }
}

impl Role for Door {
    const NODE: NodeId = NodeId::Door;
    const LOCKABLE: bool = false;
    const HAS_BUTTON: bool = true;

    fn sensor_report(&mut self, _sensors: &mut dyn SensorPort) -> Message {
        Message::Temperature(self.samples.mean())
    }

    fn record_sample(&mut self, celsius: i16) {
        self.samples.push(celsius);
    }

    fn show_opening_tick(&self, tick: u8, _unlocked: bool, leds: &mut dyn IndicatorPort) {
        leds.set_indicator(Led::Blue, tick % 2 != 0);
    }

    fn finish_opening(&self, _alarm: bool, _unlocked: bool, leds: &mut dyn IndicatorPort) {
        leds.set_indicator(Led::Blue, false);
    }
}

/// Events handled by a satellite's primary routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatelliteEvent {
    /// A command from the central.
    Command(Message),
    AlarmBlink,
    /// Automatic-opening tick `n` (1-based).
    OpeningBlink(u8),
    OpeningStop,
    Button,
    SampleDue,
    SendOutcome(SendOutcome),
}

pub struct Satellite<R: Role> {
    role: R,
    config: SatelliteConfig,
    sample_interval_ms: Option<u32>,
    status: StatusWord<SatelliteFlag>,
    alarm_blink: Option<AlarmBlink>,
    opening: Option<OpeningBlink>,
    sampler: Option<Sampler>,
}

pub type GateNode = Satellite<Gate>;
pub type DoorNode = Satellite<Door>;

impl Satellite<Gate> {
    pub fn gate(config: &SatelliteConfig) -> Self {
        Self::with_role(Gate, *config, None)
    }
}

impl Satellite<Door> {
    pub fn door(config: &SatelliteConfig, sampler: &DoorSamplerConfig) -> Self {
        Self::with_role(Door::default(), *config, Some(sampler.interval_ms))
    }
}

impl<R: Role> Satellite<R> {
    fn with_role(role: R, config: SatelliteConfig, sample_interval_ms: Option<u32>) -> Self {
        Self {
            role,
            config,
            sample_interval_ms,
            status: StatusWord::new(),
            alarm_blink: None,
            opening: None,
            sampler: None,
        }
    }

    pub fn role(&self) -> &R {
        &self.role
    }

    pub fn status(&self) -> StatusWord<SatelliteFlag> {
        self.status
    }

    pub fn is_alarm_blinking(&self) -> bool {
        self.alarm_blink.is_some()
    }

    pub fn is_opening(&self) -> bool {
        self.opening.is_some()
    }

    fn alarm_active(&self) -> bool {
        self.status.contains(SatelliteFlag::AlarmActive)
    }

    fn unlocked(&self) -> bool {
        self.status.contains(SatelliteFlag::Unlocked)
    }

    /// Green/red from `UNLOCKED`, blue off.
    fn restore_leds(&self, leds: &mut dyn IndicatorPort) {
        let unlocked = self.unlocked();
        leds.set_indicator(Led::Green, unlocked);
        leds.set_indicator(Led::Red, !unlocked);
        leds.set_indicator(Led::Blue, false);
    }

    fn set_unlocked(&mut self, unlocked: bool, io: &mut NodeIo<'_>) {
        if unlocked {
            self.status.insert(SatelliteFlag::Unlocked);
        } else {
            self.status.remove(SatelliteFlag::Unlocked);
        }
        io.leds.set_indicator(Led::Green, unlocked);
        io.leds.set_indicator(Led::Red, !unlocked);
        io.emit(AppEvent::UnlockedChanged {
            node: R::NODE,
            unlocked,
        });
    }

    fn on_command(&mut self, command: Message, io: &mut NodeIo<'_>) {
        let name = R::NODE.name();
        match command {
            Message::AlarmOn => {
                if self.status.insert(SatelliteFlag::AlarmActive) {
                    info!("{}: alarm on", name);
                    self.alarm_blink = Some(AlarmBlink::start(io.now, self.config.alarm_blink_ms));
                    io.emit(AppEvent::AlarmChanged {
                        node: R::NODE,
                        active: true,
                    });
                }
            }
            Message::AlarmOff => {
                if self.status.remove(SatelliteFlag::AlarmActive) {
                    info!("{}: alarm off", name);
                    self.alarm_blink = None;
                    self.restore_leds(io.leds);
                    io.emit(AppEvent::AlarmChanged {
                        node: R::NODE,
                        active: false,
                    });
                }
            }
            Message::AutoOpen => {
                if self.alarm_active() || self.status.contains(SatelliteFlag::AutoOpening) {
                    debug!("{}: automatic opening not permitted now", name);
                    return;
                }
                info!("{}: automatic opening started", name);
                self.status.insert(SatelliteFlag::AutoOpening);
                self.opening = Some(OpeningBlink::start(io.now, &self.config));
                io.emit(AppEvent::AutoOpeningChanged {
                    node: R::NODE,
                    active: true,
                });
            }
            Message::ReadSensor => {
                if self.alarm_active() {
                    debug!("{}: sensor read refused, alarm active", name);
                    return;
                }
                let report = self.role.sensor_report(io.sensors);
                let _ = io.reliable_send(NodeId::Central, report);
            }
            Message::GateUnlock | Message::GateLock if R::LOCKABLE => {
                if self.alarm_active() || self.status.contains(SatelliteFlag::AutoOpening) {
                    debug!("{}: lock change refused", name);
                    return;
                }
                self.set_unlocked(command == Message::GateUnlock, io);
            }
            other => debug!("{}: command {} ignored", name, other),
        }
    }
}

impl<R: Role> Node for Satellite<R> {
    type Event = SatelliteEvent;

    fn id(&self) -> NodeId {
        R::NODE
    }

    fn channels(&self) -> Channels {
        Channels::BOTH
    }

    fn start(&mut self, io: &mut NodeIo<'_>) {
        self.restore_leds(io.leds);
        if let Some(interval) = self.sample_interval_ms {
            self.sampler = Some(Sampler::start("temperature-sampler", io.now, interval));
        }
    }

    fn next_deadline(&self) -> Option<Millis> {
        earliest([
            self.alarm_blink.as_ref().and_then(AlarmBlink::next_deadline),
            self.opening.as_ref().and_then(OpeningBlink::next_deadline),
            self.sampler.as_ref().and_then(Sampler::next_deadline),
        ])
    }

    fn on_timer(&mut self, io: &mut NodeIo<'_>, mailbox: &Mailbox<SatelliteEvent>) {
        let now = io.now;
        if let Some(blink) = self.alarm_blink.as_mut() {
            while blink.poll(now) {
                mailbox.post(SatelliteEvent::AlarmBlink);
            }
        }

        if let Some(opening) = self.opening.as_mut() {
            let mut finished = false;
            while let Some(step) = opening.poll(now) {
                if let Some(tick) = step.blink {
                    mailbox.post(SatelliteEvent::OpeningBlink(tick));
                }
                if step.finished {
                    mailbox.post(SatelliteEvent::OpeningStop);
                    finished = true;
                }
            }
            if finished {
                self.opening = None;
            }
        }

        if let Some(sampler) = self.sampler.as_mut() {
            while sampler.poll(now) {
                mailbox.post(SatelliteEvent::SampleDue);
            }
        }
    }

    fn on_button(&mut self, _io: &mut NodeIo<'_>, mailbox: &Mailbox<SatelliteEvent>) {
        if R::HAS_BUTTON {
            mailbox.post(SatelliteEvent::Button);
        }
    }

    fn on_message(&mut self, from: NodeId, message: Message) -> Option<SatelliteEvent> {
        if from != NodeId::Central || message.opcode().is_none() {
            debug!("{}: {} from {} ignored", R::NODE.name(), message, from.name());
            return None;
        }
        Some(SatelliteEvent::Command(message))
    }

    fn on_send_outcome(&mut self, outcome: SendOutcome) -> Option<SatelliteEvent> {
        Some(SatelliteEvent::SendOutcome(outcome))
    }

    fn handle(&mut self, event: SatelliteEvent, io: &mut NodeIo<'_>) {
        match event {
            SatelliteEvent::Command(command) => self.on_command(command, io),
            SatelliteEvent::AlarmBlink => {
                if self.alarm_active() {
                    let on = !io.leds.any_on();
                    io.leds.set_all(on);
                }
            }
            SatelliteEvent::OpeningBlink(tick) => {
                if !self.alarm_active() && self.status.contains(SatelliteFlag::AutoOpening) {
                    self.role.show_opening_tick(tick, self.unlocked(), io.leds);
                }
            }
            SatelliteEvent::OpeningStop => {
                if !self.status.remove(SatelliteFlag::AutoOpening) {
                    debug!("{}: repeated opening stop ignored", R::NODE.name());
                    return;
                }
                info!("{}: automatic opening finished", R::NODE.name());
                self.role
                    .finish_opening(self.alarm_active(), self.unlocked(), io.leds);
                io.emit(AppEvent::AutoOpeningChanged {
                    node: R::NODE,
                    active: false,
                });
                if io.reliable_send(NodeId::Central, Message::Stop).is_err() {
                    warn!(
                        "{}: stop not sent, central still shows the automatic opening",
                        R::NODE.name()
                    );
                }
            }
            SatelliteEvent::Button => {
                if !self.alarm_active() {
                    let unlocked = !self.unlocked();
                    self.set_unlocked(unlocked, io);
                }
            }
            SatelliteEvent::SampleDue => {
                let celsius = io.sensors.sample_temperature();
                self.role.record_sample(celsius);
                io.emit(AppEvent::TemperatureSampled {
                    node: R::NODE,
                    celsius,
                });
            }
            SatelliteEvent::SendOutcome(SendOutcome::Delivered { .. }) => {}
            SatelliteEvent::SendOutcome(SendOutcome::TimedOut {
                to,
                message,
                attempts,
            }) => io.emit(AppEvent::TransmissionTimedOut {
                node: R::NODE,
                to,
                message,
                attempts,
            }),
        }
    }
}
