//! Mock adapters for integration tests.
//!
//! Records every event the nodes emit so tests can assert on the full
//! history, and replaces randomness with a script.

use std::collections::VecDeque;

use homenet::Network;
use homenet::app::events::{AppEvent, Menu};
use homenet::app::ports::{EntropyPort, EventSink};
use homenet::config::NetworkConfig;
use homenet::transport::NodeId;

// ── Event recorder ────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn last_menu(&self) -> Option<Menu> {
        self.events.iter().rev().find_map(|e| match e {
            AppEvent::AvailableCommands(menu) => Some(menu.clone()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Scripted randomness ───────────────────────────────────────

/// Replays queued values, then a fixed fallback.
#[derive(Debug, Default)]
pub struct ScriptedEntropy {
    script: VecDeque<u16>,
    pub fallback: u16,
    pub calls: usize,
}

#[allow(dead_code)]
impl ScriptedEntropy {
    pub fn push(&mut self, value: u16) {
        self.script.push_back(value);
    }
}

impl EntropyPort for ScriptedEntropy {
    fn below(&mut self, bound: u16) -> u16 {
        self.calls += 1;
        self.script.pop_front().unwrap_or(self.fallback) % bound
    }
}

// ── Network helpers ───────────────────────────────────────────

pub type TestNetwork = Network<RecordingSink, ScriptedEntropy>;

/// Default timing, no radio loss.
pub fn network() -> TestNetwork {
    network_with(&NetworkConfig::lossless())
}

pub fn network_with(config: &NetworkConfig) -> TestNetwork {
    Network::new(config, RecordingSink::default(), ScriptedEntropy::default())
}

/// Enter a click command on the central and let it play out.
pub fn click(net: &mut TestNetwork, times: u8) {
    for _ in 0..times {
        net.press_button(NodeId::Central);
        net.advance(100);
    }
    // click window, then radio latency and ACK round trip
    net.advance(4200);
}
