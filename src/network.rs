//! The whole installation on one virtual clock.
//!
//! ```text
//!               ┌──────────────────── Network ────────────────────┐
//!  operator ───▶│ press / threshold / sensor overrides            │
//!               │                                                 │
//!               │  central   gate   door   kitchen   bathroom     │
//!               │     │        │      │       │          │        │
//!               │     └────────┴──────┴───────┘      (no radio)   │
//!               │                 Radio                           │
//!               └─────────────────────────────────────────────────┘
//! ```
//!
//! Time only moves when [`Network::run_until`] is called.  At each
//! instant the network repeats, until nothing is left to do:
//!
//! 1. deliver radio frames that have arrived
//! 2. fire expired node and link timers
//! 3. drain every mailbox through its node's primary routine
//! 4. move queued frames from every link onto the radio

use core::fmt;

use log::{debug, info, warn};

use crate::app::ports::{EntropyPort, EventSink};
use crate::config::NetworkConfig;
use crate::drivers::leds::LedState;
use crate::nodes::bathroom::Bathroom;
use crate::nodes::central::{Central, CentralEvent};
use crate::nodes::kitchen::Kitchen;
use crate::nodes::satellite::{DoorNode, GateNode, Satellite};
use crate::nodes::station::{Endpoint, Env, Station};
use crate::operator::OperatorInput;
use crate::scheduler::{Millis, earliest};
use crate::sensors::sim::SimSensors;
use crate::transport::NodeId;
use crate::transport::radio::{Radio, RadioStats};

/// Rounds of work allowed at a single instant before the network gives up.
const MAX_ROUNDS_PER_INSTANT: usize = 64;

struct Parts<'a> {
    now: Millis,
    radio: &'a mut Radio,
    stations: [&'a mut dyn Endpoint; 5],
    env: Env<'a>,
}

pub struct Network<S: EventSink, E: EntropyPort> {
    now: Millis,
    radio: Radio,
    central: Station<Central>,
    gate: Station<GateNode>,
    door: Station<DoorNode>,
    kitchen: Station<Kitchen>,
    bathroom: Station<Bathroom>,
    sensors: SimSensors,
    entropy: E,
    sink: S,
}

impl<S: EventSink, E: EntropyPort> Network<S, E> {
    /// Build and start every station at time 0.
    pub fn new(config: &NetworkConfig, sink: S, entropy: E) -> Self {
        let link = config.link;
        let mut network = Self {
            now: 0,
            radio: Radio::new(config.radio),
            central: Station::new(Central::new(&config.central), link),
            gate: Station::new(Satellite::gate(&config.gate), link),
            door: Station::new(Satellite::door(&config.door, &config.door_sampler), link),
            kitchen: Station::new(Kitchen::new(&config.kitchen), link),
            bathroom: Station::new(Bathroom::new(&config.bathroom), link),
            sensors: SimSensors::new(config.sensors),
            entropy,
            sink,
        };

        let Parts {
            now,
            radio,
            mut stations,
            mut env,
        } = network.parts();
        for station in stations.iter_mut() {
            radio.attach(station.id(), station.channels());
            station.start(now, &mut env);
        }
        network.settle();
        info!("network up: {} stations", NodeId::ALL.len());
        network
    }

    fn parts(&mut self) -> Parts<'_> {
        let Self {
            now,
            radio,
            central,
            gate,
            door,
            kitchen,
            bathroom,
            sensors,
            entropy,
            sink,
        } = self;
        Parts {
            now: *now,
            radio,
            stations: [central, gate, door, kitchen, bathroom],
            env: Env {
                sensors,
                entropy,
                sink,
            },
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Earliest instant at which something happens.
    pub fn next_event(&self) -> Option<Millis> {
        earliest([
            self.radio.next_arrival(),
            self.central.next_deadline(),
            self.gate.next_deadline(),
            self.door.next_deadline(),
            self.kitchen.next_deadline(),
            self.bathroom.next_deadline(),
        ])
    }

    /// Run every event up to and including `target`, then set the clock
    /// to `target`.
    pub fn run_until(&mut self, target: Millis) {
        self.settle();
        while let Some(next) = self.next_event().filter(|t| *t <= target) {
            self.now = self.now.max(next);
            self.settle();
        }
        self.now = self.now.max(target);
    }

    pub fn advance(&mut self, ms: u32) {
        self.run_until(self.now + Millis::from(ms));
    }

    /// Do all the work due at the current instant.
    pub fn settle(&mut self) {
        let Parts {
            now,
            radio,
            mut stations,
            mut env,
        } = self.parts();

        for _ in 0..MAX_ROUNDS_PER_INSTANT {
            let mut busy = false;

            while let Some((to, frame)) = radio.pop_due(now) {
                busy = true;
                match stations.iter_mut().find(|s| s.id() == to) {
                    Some(station) => station.receive(frame),
                    None => debug!("network: no station for {}", to.name()),
                }
            }

            for station in stations.iter_mut() {
                if station.next_deadline().is_some_and(|d| d <= now) {
                    station.fire_timers(now, &mut env);
                    busy = true;
                }
            }

            for station in stations.iter_mut() {
                if station.process(now, &mut env) > 0 {
                    busy = true;
                }
            }

            for station in stations.iter_mut() {
                while let Some(frame) = station.take_outbound() {
                    radio.transmit(frame, now, &mut *env.entropy);
                    busy = true;
                }
            }

            if !busy {
                return;
            }
        }
        warn!("network: still busy after {} rounds at t={} ms", MAX_ROUNDS_PER_INSTANT, now);
    }

    pub fn press_button(&mut self, node: NodeId) {
        {
            let Parts {
                now,
                mut stations,
                mut env,
                ..
            } = self.parts();
            if let Some(station) = stations.iter_mut().find(|s| s.id() == node) {
                debug!("network: button pressed on {}", node.name());
                station.press_button(now, &mut env);
            }
        }
        self.settle();
    }

    /// Apply one operator input.  Returns `false` on [`OperatorInput::Quit`].
    pub fn apply(&mut self, input: OperatorInput) -> bool {
        match input {
            OperatorInput::Press(node) => self.press_button(node),
            OperatorInput::Threshold(n) => {
                if !self.central.post(CentralEvent::ThresholdRequest(n)) {
                    warn!("network: central busy, threshold {} dropped", n);
                }
                self.settle();
            }
            OperatorInput::SetHumidity(h) => self.sensors.set_humidity(h),
            OperatorInput::SetTemperature(t) => self.sensors.set_temperature(t),
            OperatorInput::SetLight(l) => self.sensors.set_light(l),
            OperatorInput::Status => info!("\n{}", self.snapshot()),
            OperatorInput::Quit => return false,
        }
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        let kitchen = self.kitchen.node();
        let bathroom = self.bathroom.node();
        Snapshot {
            now: self.now,
            central: format!("{:?}", self.central.node().status()),
            gate: format!("{:?}", self.gate.node().status()),
            door: format!("{:?}", self.door.node().status()),
            kitchen: format!(
                "{:?} threshold {} C, last {} C",
                kitchen.status(),
                kitchen.warning_threshold(),
                kitchen.temperature()
            ),
            bathroom: format!("{:?} humidity {}%", bathroom.status(), bathroom.humidity()),
            leds: NodeId::ALL.map(|id| (id, self.led_state(id))),
            radio: self.radio.stats(),
        }
    }

    pub fn led_state(&self, node: NodeId) -> LedState {
        match node {
            NodeId::Central => self.central.led_state(),
            NodeId::Gate => self.gate.led_state(),
            NodeId::Door => self.door.led_state(),
            NodeId::Kitchen => self.kitchen.led_state(),
            NodeId::Bathroom => self.bathroom.led_state(),
        }
    }

    pub fn central(&self) -> &Station<Central> {
        &self.central
    }

    pub fn gate(&self) -> &Station<GateNode> {
        &self.gate
    }

    pub fn door(&self) -> &Station<DoorNode> {
        &self.door
    }

    pub fn kitchen(&self) -> &Station<Kitchen> {
        &self.kitchen
    }

    pub fn bathroom(&self) -> &Station<Bathroom> {
        &self.bathroom
    }

    pub fn radio(&self) -> &Radio {
        &self.radio
    }

    pub fn sensors_mut(&mut self) -> &mut SimSensors {
        &mut self.sensors
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn entropy_mut(&mut self) -> &mut E {
        &mut self.entropy
    }
}

/// Human-readable network summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub now: Millis,
    pub central: String,
    pub gate: String,
    pub door: String,
    pub kitchen: String,
    pub bathroom: String,
    pub leds: [(NodeId, LedState); 5],
    pub radio: RadioStats,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "t = {} ms", self.now)?;
        let rows = [
            (NodeId::Central, &self.central),
            (NodeId::Gate, &self.gate),
            (NodeId::Door, &self.door),
            (NodeId::Kitchen, &self.kitchen),
            (NodeId::Bathroom, &self.bathroom),
        ];
        for ((id, status), (_, leds)) in rows.iter().zip(self.leds.iter()) {
            writeln!(f, "  {:<9} [{}] {}", id.name(), leds, status)?;
        }
        let r = &self.radio;
        write!(
            f,
            "  radio     {} sent, {} delivered, {} lost, {} unreachable",
            r.transmitted, r.delivered, r.lost, r.unreachable
        )
    }
}
