//! Single-station test bench.

use std::collections::VecDeque;

use crate::app::events::{AppEvent, Menu};
use crate::app::ports::{EntropyPort, EventSink};
use crate::config::LinkConfig;
use crate::drivers::leds::LedState;
use crate::nodes::station::{Endpoint, Env, Node, Station};
use crate::scheduler::Millis;
use crate::sensors::sim::SimSensors;
use crate::transport::NodeId;
use crate::transport::link::{Frame, FrameKind};
use crate::transport::wire::Message;

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn menus(&self) -> Vec<Menu> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::AvailableCommands(menu) => Some(menu.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

/// Replays queued values, then returns 0.
#[derive(Debug, Default)]
pub struct ScriptedEntropy {
    script: VecDeque<u16>,
}

impl ScriptedEntropy {
    pub fn push(&mut self, value: u16) {
        self.script.push_back(value);
    }
}

impl EntropyPort for ScriptedEntropy {
    fn below(&mut self, bound: u16) -> u16 {
        self.script.pop_front().map_or(0, |v| v % bound)
    }
}

pub struct Bench<N: Node> {
    pub station: Station<N>,
    pub sensors: SimSensors,
    pub entropy: ScriptedEntropy,
    pub sink: RecordingSink,
    pub now: Millis,
    next_seq: u8,
}

impl<N: Node> Bench<N> {
    pub fn new(node: N) -> Self {
        let mut bench = Self {
            station: Station::new(node, LinkConfig::default()),
            sensors: SimSensors::default(),
            entropy: ScriptedEntropy::default(),
            sink: RecordingSink::default(),
            now: 0,
            next_seq: 0,
        };
        let Self {
            station,
            sensors,
            entropy,
            sink,
            now,
            ..
        } = &mut bench;
        let mut env = Env {
            sensors,
            entropy,
            sink,
        };
        station.start(*now, &mut env);
        station.process(*now, &mut env);
        bench
    }

    pub fn node(&self) -> &N {
        self.station.node()
    }

    pub fn leds(&self) -> LedState {
        self.station.led_state()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        Endpoint::next_deadline(&self.station)
    }

    fn run(&mut self, step: impl FnOnce(&mut Station<N>, Millis, &mut Env<'_>)) {
        let Self {
            station,
            sensors,
            entropy,
            sink,
            now,
            ..
        } = self;
        let mut env = Env {
            sensors,
            entropy,
            sink,
        };
        step(station, *now, &mut env);
        station.process(*now, &mut env);
    }

    pub fn press(&mut self) {
        self.run(|station, now, env| station.press_button(now, env));
    }

    /// Post an event straight into the mailbox and drain it.
    pub fn post(&mut self, event: N::Event) {
        self.run(|station, _, _| {
            station.post(event);
        });
    }

    /// Fire every deadline up to `now + ms`.
    pub fn advance(&mut self, ms: u32) {
        let target = self.now + Millis::from(ms);
        while let Some(deadline) = self.next_deadline().filter(|d| *d <= target) {
            self.now = self.now.max(deadline);
            self.run(|station, now, env| station.fire_timers(now, env));
        }
        self.now = target;
    }

    /// A reliable data frame from `from`.
    pub fn deliver(&mut self, from: NodeId, message: Message) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        let frame = Frame {
            from,
            to: Some(self.station.node().id()),
            kind: FrameKind::Data { seq },
            payload: message.encode().unwrap(),
        };
        self.run(|station, _, _| station.receive(frame));
    }

    pub fn broadcast_in(&mut self, from: NodeId, message: Message) {
        let frame = Frame {
            from,
            to: None,
            kind: FrameKind::Broadcast,
            payload: message.encode().unwrap(),
        };
        self.run(|station, _, _| station.receive(frame));
    }

    pub fn outbound(&mut self) -> Vec<Frame> {
        std::iter::from_fn(|| self.station.take_outbound()).collect()
    }

    /// Queued non-ACK frames as `(destination, message)`.
    pub fn sent_messages(&mut self) -> Vec<(Option<NodeId>, Message)> {
        self.outbound()
            .into_iter()
            .filter(|f| !f.is_ack())
            .map(|f| (f.to, Message::decode(&f.payload).unwrap()))
            .collect()
    }
}
