//! Shared lossy radio medium.
//!
//! Every attached node declares which channels it listens on.  A
//! transmitted frame is copied to each eligible receiver, survives a
//! per-receiver loss roll, and arrives `latency_ms` later.
//!
//! | Channel   | Used for                    | Loss knob                |
//! |-----------|-----------------------------|--------------------------|
//! | broadcast | alarm / auto-open commands  | `broadcast_loss_percent` |
//! | unicast   | reliable data + ACKs        | `data_loss_percent`, `ack_loss_percent` |

use heapless::Deque;
use log::{debug, warn};

use crate::app::ports::EntropyPort;
use crate::config::RadioConfig;
use crate::scheduler::Millis;
use crate::transport::NodeId;
use crate::transport::link::{Frame, FrameKind};

/// Frames that may be airborne at once.
const IN_FLIGHT_CAP: usize = 32;

/// Channels a node listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Channels {
    pub broadcast: bool,
    pub unicast: bool,
}

impl Channels {
    pub const NONE: Self = Self {
        broadcast: false,
        unicast: false,
    };
    pub const UNICAST: Self = Self {
        broadcast: false,
        unicast: true,
    };
    pub const BOTH: Self = Self {
        broadcast: true,
        unicast: true,
    };
}

/// Delivery counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RadioStats {
    pub transmitted: u32,
    pub delivered: u32,
    pub lost: u32,
    pub unreachable: u32,
}

#[derive(Debug, Clone)]
struct InFlight {
    arrive_at: Millis,
    to: NodeId,
    frame: Frame,
}

/// The medium.
pub struct Radio {
    config: RadioConfig,
    listeners: [(NodeId, Channels); 5],
    in_flight: Deque<InFlight, IN_FLIGHT_CAP>,
    stats: RadioStats,
}

impl Radio {
    pub fn new(config: RadioConfig) -> Self {
        Self {
            config,
            listeners: NodeId::ALL.map(|id| (id, Channels::NONE)),
            in_flight: Deque::new(),
            stats: RadioStats::default(),
        }
    }

    pub fn attach(&mut self, node: NodeId, channels: Channels) {
        for entry in &mut self.listeners {
            if entry.0 == node {
                entry.1 = channels;
            }
        }
    }

    pub fn channels(&self, node: NodeId) -> Channels {
        self.listeners
            .iter()
            .find(|(id, _)| *id == node)
            .map_or(Channels::NONE, |(_, ch)| *ch)
    }

    pub fn stats(&self) -> RadioStats {
        self.stats
    }

    /// Put a frame on the air.
    pub fn transmit(&mut self, frame: Frame, now: Millis, entropy: &mut dyn EntropyPort) {
        self.stats.transmitted += 1;
        match frame.to {
            None => {
                for (node, channels) in self.listeners {
                    if node != frame.from && channels.broadcast {
                        let loss = self.config.broadcast_loss_percent;
                        self.carry(frame.clone(), node, loss, now, entropy);
                    }
                }
            }
            Some(to) => {
                if !self.channels(to).unicast {
                    self.stats.unreachable += 1;
                    debug!(
                        "radio: {} has no unicast channel, frame from {} lost",
                        to.name(),
                        frame.from.name()
                    );
                    return;
                }
                let loss = match frame.kind {
                    FrameKind::Ack { .. } => self.config.ack_loss_percent,
                    _ => self.config.data_loss_percent,
                };
                self.carry(frame, to, loss, now, entropy);
            }
        }
    }

    fn carry(
        &mut self,
        frame: Frame,
        to: NodeId,
        loss_percent: u8,
        now: Millis,
        entropy: &mut dyn EntropyPort,
    ) {
        if loss_percent > 0 && entropy.below(100) < u16::from(loss_percent) {
            self.stats.lost += 1;
            debug!("radio: {:?} {} -> {} lost", frame.kind, frame.from.name(), to.name());
            return;
        }
        let arrive_at = now + Millis::from(self.config.latency_ms);
        if self.in_flight.push_back(InFlight { arrive_at, to, frame }).is_err() {
            self.stats.lost += 1;
            warn!("radio: medium saturated, frame to {} dropped", to.name());
        }
    }

    /// Arrival time of the oldest airborne frame.
    pub fn next_arrival(&self) -> Option<Millis> {
        self.in_flight.front().map(|f| f.arrive_at)
    }

    /// Take the next frame that has arrived by `now`.
    ///
    /// Latency is constant, so frames arrive in transmission order.
    pub fn pop_due(&mut self, now: Millis) -> Option<(NodeId, Frame)> {
        if self.next_arrival()? > now {
            return None;
        }
        let f = self.in_flight.pop_front()?;
        self.stats.delivered += 1;
        Some((f.to, f.frame))
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
