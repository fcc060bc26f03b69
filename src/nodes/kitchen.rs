//! Kitchen fire detection.
//!
//! Every sampling period the kitchen reads its temperature (plus any
//! jump armed by the button) and, above the warning threshold, switches
//! the camera on for a short confirmation window.  A button press inside
//! the window confirms the fire and a `Fire` report goes to the central,
//! which answers with `CameraOff`.
//!
//! LEDs: green = camera on, red = camera off, blue unused.

use core::mem;

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::IndicatorPort;
use crate::config::KitchenConfig;
use crate::drivers::leds::Led;
use crate::events::Mailbox;
use crate::nodes::helpers::{Camera, CameraVerdict, Sampler};
use crate::nodes::station::{Node, NodeIo};
use crate::nodes::status::{KitchenFlag, StatusWord};
use crate::scheduler::{Millis, earliest};
use crate::transport::NodeId;
use crate::transport::link::SendOutcome;
use crate::transport::radio::Channels;
use crate::transport::wire::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitchenEvent {
    SampleDue,
    Button,
    /// The camera helper saw a confirmation press.
    FireDetected,
    /// The camera window closed without a confirmation.
    CameraExited,
    /// A message from the central.
    Command(Message),
    SendOutcome(SendOutcome),
}

pub struct Kitchen {
    config: KitchenConfig,
    status: StatusWord<KitchenFlag>,
    warning_threshold: u16,
    /// Added to the next sample, then cleared.
    jump: u16,
    temperature: i16,
    sampler: Option<Sampler>,
    camera: Option<Camera>,
}

fn show_camera(leds: &mut dyn IndicatorPort, on: bool) {
    leds.set_indicator(Led::Green, on);
    leds.set_indicator(Led::Red, !on);
}

impl Kitchen {
    pub fn new(config: &KitchenConfig) -> Self {
        Self {
            config: *config,
            status: StatusWord::new(),
            warning_threshold: config.warning_threshold,
            jump: 0,
            temperature: 0,
            sampler: None,
            camera: None,
        }
    }

    pub fn status(&self) -> StatusWord<KitchenFlag> {
        self.status
    }

    pub fn warning_threshold(&self) -> u16 {
        self.warning_threshold
    }

    /// Last temperature sampled, jump included.
    pub fn temperature(&self) -> i16 {
        self.temperature
    }

    pub fn pending_jump(&self) -> u16 {
        self.jump
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    fn camera_stopped(&mut self, io: &mut NodeIo<'_>) {
        if self.status.remove(KitchenFlag::CameraOn) {
            io.emit(AppEvent::CameraChanged(false));
        }
    }

    fn on_sample(&mut self, io: &mut NodeIo<'_>) {
        let jump = mem::take(&mut self.jump);
        let jump = i16::try_from(jump).unwrap_or(i16::MAX);
        self.temperature = io.sensors.sample_temperature().saturating_add(jump);
        io.emit(AppEvent::KitchenTemperature(self.temperature));

        if i32::from(self.temperature) <= i32::from(self.warning_threshold) {
            return;
        }
        warn!(
            "kitchen: {} C above warning threshold {}",
            self.temperature, self.warning_threshold
        );
        if self.status.insert(KitchenFlag::CameraOn) {
            io.emit(AppEvent::CameraChanged(true));
        }
        if self.camera.is_none() {
            self.camera = Some(Camera::start(io.now, self.config.camera_window_ms));
            show_camera(io.leds, true);
        }
    }

    fn on_command(&mut self, message: Message, io: &mut NodeIo<'_>) {
        match message {
            Message::Threshold(n) if n > 0 => {
                self.warning_threshold = u16::try_from(n).unwrap_or(u16::MAX);
                info!("kitchen: warning threshold is now {}", self.warning_threshold);
                io.emit(AppEvent::WarningThresholdChanged(self.warning_threshold));
            }
            Message::Threshold(n) => debug!("kitchen: threshold {} ignored", n),
            Message::CameraOff => {
                if self.camera.take().is_some() {
                    info!("kitchen: camera terminated by central");
                    show_camera(io.leds, false);
                }
                self.camera_stopped(io);
            }
            other => debug!("kitchen: {} ignored", other),
        }
    }
}

impl Node for Kitchen {
    type Event = KitchenEvent;

    fn id(&self) -> NodeId {
        NodeId::Kitchen
    }

    fn channels(&self) -> Channels {
        Channels::UNICAST
    }

    fn start(&mut self, io: &mut NodeIo<'_>) {
        show_camera(io.leds, false);
        io.leds.set_indicator(Led::Blue, false);
        self.sampler = Some(Sampler::start(
            "kitchen-sampler",
            io.now,
            self.config.sample_interval_ms,
        ));
    }

    fn next_deadline(&self) -> Option<Millis> {
        earliest([
            self.sampler.as_ref().and_then(Sampler::next_deadline),
            self.camera.as_ref().and_then(Camera::next_deadline),
        ])
    }

    fn on_timer(&mut self, io: &mut NodeIo<'_>, mailbox: &Mailbox<KitchenEvent>) {
        let now = io.now;
        if let Some(sampler) = self.sampler.as_mut() {
            while sampler.poll(now) {
                mailbox.post(KitchenEvent::SampleDue);
            }
        }
        let expired = self
            .camera
            .as_mut()
            .and_then(|camera| camera.poll(now))
            .is_some_and(|verdict| verdict == CameraVerdict::NoFire);
        if expired {
            debug!("kitchen: no fire confirmed, camera off");
            self.camera = None;
            show_camera(io.leds, false);
            mailbox.post(KitchenEvent::CameraExited);
        }
    }

    fn on_button(&mut self, _io: &mut NodeIo<'_>, mailbox: &Mailbox<KitchenEvent>) {
        mailbox.post(KitchenEvent::Button);
        let confirmed = self
            .camera
            .as_mut()
            .and_then(Camera::on_button)
            .is_some_and(|verdict| verdict == CameraVerdict::FireConfirmed);
        if confirmed {
            mailbox.post(KitchenEvent::FireDetected);
        }
    }

    fn on_message(&mut self, from: NodeId, message: Message) -> Option<KitchenEvent> {
        if from != NodeId::Central {
            debug!("kitchen: {} from {} ignored", message, from.name());
            return None;
        }
        Some(KitchenEvent::Command(message))
    }

    fn on_send_outcome(&mut self, outcome: SendOutcome) -> Option<KitchenEvent> {
        Some(KitchenEvent::SendOutcome(outcome))
    }

    fn handle(&mut self, event: KitchenEvent, io: &mut NodeIo<'_>) {
        match event {
            KitchenEvent::SampleDue => self.on_sample(io),
            KitchenEvent::Button => {
                if self.status.contains(KitchenFlag::CameraOn) {
                    return;
                }
                self.jump = io.entropy.below(self.config.max_jump.saturating_add(1));
                info!("kitchen: next sample jumps by {}", self.jump);
                io.emit(AppEvent::JumpArmed(self.jump));
            }
            KitchenEvent::FireDetected => {
                warn!("kitchen: fire confirmed at {} C", self.temperature);
                if io
                    .reliable_send(NodeId::Central, Message::Fire(self.temperature))
                    .is_err()
                {
                    warn!("kitchen: fire report lost, camera waits for a camera off");
                }
            }
            KitchenEvent::CameraExited => self.camera_stopped(io),
            KitchenEvent::Command(message) => self.on_command(message, io),
            KitchenEvent::SendOutcome(SendOutcome::Delivered { .. }) => {}
            KitchenEvent::SendOutcome(SendOutcome::TimedOut {
                to,
                message,
                attempts,
            }) => io.emit(AppEvent::TransmissionTimedOut {
                node: NodeId::Kitchen,
                to,
                message,
                attempts,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::leds::LedState;
    use crate::nodes::helpers::CameraPhase;
    use crate::nodes::testing::Bench;

    const CAMERA_OFF: LedState = LedState {
        red: true,
        green: false,
        blue: false,
    };

    fn bench() -> Bench<Kitchen> {
        let mut bench = Bench::new(Kitchen::new(&KitchenConfig::default()));
        bench.sensors.set_temperature(21);
        bench
    }

    #[test]
    fn starts_with_camera_off() {
        let bench = bench();
        assert_eq!(bench.leds(), CAMERA_OFF);
        assert_eq!(bench.next_deadline(), Some(10_000));
    }

    #[test]
    fn jump_applies_to_next_sample_only() {
        let mut bench = bench();
        bench.entropy.push(12);
        bench.press();
        assert_eq!(bench.node().pending_jump(), 12);

        bench.advance(10_000);
        assert_eq!(bench.node().temperature(), 33);
        assert_eq!(bench.node().pending_jump(), 0);
        bench.advance(10_000);
        assert_eq!(bench.node().temperature(), 21);
    }

    #[test]
    fn camera_window_expires_without_press() {
        let mut bench = bench();
        bench.sensors.set_temperature(45);
        bench.advance(10_000);
        assert!(bench.node().status().contains(KitchenFlag::CameraOn));
        assert!(bench.leds().green);

        bench.advance(4000);
        assert!(bench.node().camera().is_none());
        assert!(!bench.node().status().contains(KitchenFlag::CameraOn));
        assert_eq!(bench.leds(), CAMERA_OFF);
        assert!(bench.sent_messages().is_empty());
    }

    #[test]
    fn press_in_window_reports_fire_and_waits_for_camoff() {
        let mut bench = bench();
        bench.sensors.set_temperature(45);
        bench.advance(10_000);
        bench.advance(1000);
        bench.press();

        assert_eq!(
            bench.sent_messages(),
            vec![(Some(NodeId::Central), Message::Fire(45))]
        );
        assert_eq!(
            bench.node().camera().map(Camera::phase),
            Some(CameraPhase::AwaitingTermination)
        );
        // no jump while the camera is on
        assert_eq!(bench.node().pending_jump(), 0);

        bench.advance(5000);
        assert!(bench.leds().green);

        bench.deliver(NodeId::Central, Message::CameraOff);
        assert!(bench.node().camera().is_none());
        assert!(!bench.node().status().contains(KitchenFlag::CameraOn));
        assert_eq!(bench.leds(), CAMERA_OFF);
    }

    #[test]
    fn threshold_updates_ignore_non_positive() {
        let mut bench = bench();
        bench.deliver(NodeId::Central, Message::Threshold(55));
        assert_eq!(bench.node().warning_threshold(), 55);
        bench.deliver(NodeId::Central, Message::Threshold(0));
        bench.deliver(NodeId::Central, Message::Threshold(-3));
        assert_eq!(bench.node().warning_threshold(), 55);
    }

    #[test]
    fn sample_at_threshold_does_not_start_camera() {
        let mut bench = bench();
        bench.sensors.set_temperature(40);
        bench.advance(10_000);
        assert!(bench.node().camera().is_none());
        assert!(bench.node().status().is_empty());
    }
}
