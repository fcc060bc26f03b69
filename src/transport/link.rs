//! Per-node radio endpoint.
//!
//! A [`Link`] offers two services on top of the shared medium:
//!
//! - **broadcast** — one frame to every listening neighbour, no ACK, no retry
//! - **reliable unicast** — one outstanding transmission at a time, ACKed by
//!   the receiver, retransmitted on timeout up to a bounded count
//!
//! ```text
//!                 reliable_send()
//!   ┌──────┐ ─────────────────────────▶ ┌──────────────┐
//!   │ Idle │                            │  In flight   │──┐ timeout,
//!   └──────┘ ◀───────────────────────── │ attempts = n │◀─┘ attempts <= max
//!      ▲        ACK  → Delivered        └──────────────┘
//!      └─────── timeout, attempts > max → TimedOut
//! ```
//!
//! The receiving side ACKs every data frame addressed to it and passes the
//! payload up every time, so a lost ACK can produce duplicate deliveries.
//! Frames produced by the link wait in a small outbox until the network
//! moves them onto the radio.

use heapless::Deque;
use log::{debug, info, warn};

use crate::config::LinkConfig;
use crate::error::TransportError;
use crate::scheduler::Millis;
use crate::transport::NodeId;
use crate::transport::wire::{Message, Payload};

/// Frames waiting for the radio.
const OUTBOX_DEPTH: usize = 8;

/// Frame type on the medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Broadcast,
    Data { seq: u8 },
    Ack { seq: u8 },
}

/// One radio frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub from: NodeId,
    /// `None` for broadcasts.
    pub to: Option<NodeId>,
    pub kind: FrameKind,
    pub payload: Payload,
}

impl Frame {
    pub fn is_ack(&self) -> bool {
        matches!(self.kind, FrameKind::Ack { .. })
    }
}

/// The single outstanding reliable transmission of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransmission {
    pub to: NodeId,
    pub seq: u8,
    pub message: Message,
    pub payload: Payload,
    /// Transmissions so far, including the first.
    pub attempts: u8,
    pub retry_at: Millis,
}

/// Terminal result of a reliable send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered {
        to: NodeId,
        message: Message,
        attempts: u8,
    },
    TimedOut {
        to: NodeId,
        message: Message,
        attempts: u8,
    },
}

/// What a received frame means to the node above the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A broadcast or data payload for the node.
    Payload { from: NodeId, payload: Payload },
    /// A pending transmission was acknowledged.
    Outcome(SendOutcome),
}

/// Per-node endpoint.
pub struct Link {
    node: NodeId,
    config: LinkConfig,
    pending: Option<PendingTransmission>,
    next_seq: u8,
    outbox: Deque<Frame, OUTBOX_DEPTH>,
}

impl Link {
    pub fn new(node: NodeId, config: LinkConfig) -> Self {
        Self {
            node,
            config,
            pending: None,
            next_seq: 0,
            outbox: Deque::new(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Queue a broadcast.  Fire and forget.
    pub fn broadcast(&mut self, message: Message) -> Result<(), TransportError> {
        let payload = message.encode().map_err(|_| TransportError::PayloadTooLarge)?;
        self.enqueue(Frame {
            from: self.node,
            to: None,
            kind: FrameKind::Broadcast,
            payload,
        })?;
        debug!("{}: broadcast {}", self.node.name(), message);
        Ok(())
    }

    /// Start a reliable transmission.
    ///
    /// Fails with [`TransportError::Busy`] while a previous transmission is
    /// still unresolved; the pending one is left untouched.
    pub fn reliable_send(
        &mut self,
        to: NodeId,
        message: Message,
        now: Millis,
    ) -> Result<(), TransportError> {
        if self.pending.is_some() {
            return Err(TransportError::Busy);
        }
        let payload = message.encode().map_err(|_| TransportError::PayloadTooLarge)?;
        let seq = self.next_seq;
        self.enqueue(Frame {
            from: self.node,
            to: Some(to),
            kind: FrameKind::Data { seq },
            payload: payload.clone(),
        })?;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.pending = Some(PendingTransmission {
            to,
            seq,
            message,
            payload,
            attempts: 1,
            retry_at: now + Millis::from(self.config.retransmit_timeout_ms),
        });
        debug!("{}: reliable {} -> {} (seq {})", self.node.name(), message, to.name(), seq);
        Ok(())
    }

    pub fn is_transmitting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingTransmission> {
        self.pending.as_ref()
    }

    /// Next retransmission deadline, if a send is in flight.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(|p| p.retry_at)
    }

    /// Drive the retransmission timer.  Returns the outcome once the
    /// transmission gives up.
    pub fn poll(&mut self, now: Millis) -> Option<SendOutcome> {
        let timeout = Millis::from(self.config.retransmit_timeout_ms);
        let pending = self.pending.as_mut()?;
        if now < pending.retry_at {
            return None;
        }

        if pending.attempts > self.config.max_retransmissions {
            let outcome = SendOutcome::TimedOut {
                to: pending.to,
                message: pending.message,
                attempts: pending.attempts,
            };
            warn!(
                "{}: {} -> {} timed out after {} attempts",
                self.node.name(),
                pending.message,
                pending.to.name(),
                pending.attempts
            );
            self.pending = None;
            return Some(outcome);
        }

        let frame = Frame {
            from: self.node,
            to: Some(pending.to),
            kind: FrameKind::Data { seq: pending.seq },
            payload: pending.payload.clone(),
        };
        pending.retry_at = now + timeout;
        if self.outbox.push_back(frame).is_err() {
            warn!("{}: outbox full, retransmission deferred", self.node.name());
            return None;
        }
        pending.attempts += 1;
        debug!(
            "{}: retransmit seq {} to {} (attempt {})",
            self.node.name(),
            pending.seq,
            pending.to.name(),
            pending.attempts
        );
        None
    }

    /// Accept a frame from the medium.
    pub fn receive(&mut self, frame: Frame) -> Option<Inbound> {
        if frame.from == self.node || frame.to.is_some_and(|to| to != self.node) {
            return None;
        }

        match frame.kind {
            FrameKind::Broadcast => Some(Inbound::Payload {
                from: frame.from,
                payload: frame.payload,
            }),
            FrameKind::Data { seq } => {
                let ack = Frame {
                    from: self.node,
                    to: Some(frame.from),
                    kind: FrameKind::Ack { seq },
                    payload: Payload::new(),
                };
                if self.outbox.push_back(ack).is_err() {
                    warn!(
                        "{}: outbox full, ACK to {} dropped",
                        self.node.name(),
                        frame.from.name()
                    );
                }
                Some(Inbound::Payload {
                    from: frame.from,
                    payload: frame.payload,
                })
            }
            FrameKind::Ack { seq } => {
                let matches = self
                    .pending
                    .as_ref()
                    .is_some_and(|p| p.to == frame.from && p.seq == seq);
                if !matches {
                    debug!(
                        "{}: stale ACK seq {} from {}",
                        self.node.name(),
                        seq,
                        frame.from.name()
                    );
                    return None;
                }
                let pending = self.pending.take()?;
                info!(
                    "{}: {} delivered to {} after {} attempt(s)",
                    self.node.name(),
                    pending.message,
                    pending.to.name(),
                    pending.attempts
                );
                Some(Inbound::Outcome(SendOutcome::Delivered {
                    to: pending.to,
                    message: pending.message,
                    attempts: pending.attempts,
                }))
            }
        }
    }

    /// Next frame for the radio.
    pub fn take_outbound(&mut self) -> Option<Frame> {
        self.outbox.pop_front()
    }

    #[cfg(test)]
    fn outbound_len(&self) -> usize {
        self.outbox.len()
    }

    fn enqueue(&mut self, frame: Frame) -> Result<(), TransportError> {
        self.outbox
            .push_back(frame)
            .map_err(|_| TransportError::OutboxFull)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LinkConfig {
        LinkConfig {
            max_retransmissions: 2,
            retransmit_timeout_ms: 100,
        }
    }

    fn ack_for(frame: &Frame) -> Frame {
        let FrameKind::Data { seq } = frame.kind else {
            panic!("not a data frame: {frame:?}");
        };
        Frame {
            from: frame.to.unwrap(),
            to: Some(frame.from),
            kind: FrameKind::Ack { seq },
            payload: Payload::new(),
        }
    }

    #[test]
    fn broadcast_has_no_destination() {
        let mut link = Link::new(NodeId::Central, config());
        link.broadcast(Message::AlarmOn).unwrap();
        let frame = link.take_outbound().unwrap();
        assert_eq!(frame.to, None);
        assert_eq!(frame.kind, FrameKind::Broadcast);
        assert_eq!(frame.payload.as_slice(), &[1]);
        assert!(!link.is_transmitting());
    }

    #[test]
    fn second_send_is_busy_and_leaves_pending_untouched() {
        let mut link = Link::new(NodeId::Central, config());
        link.reliable_send(NodeId::Gate, Message::GateUnlock, 0).unwrap();
        let before = link.pending().cloned();

        assert_eq!(
            link.reliable_send(NodeId::Door, Message::ReadSensor, 10),
            Err(TransportError::Busy)
        );
        assert_eq!(link.pending().cloned(), before);
        assert_eq!(link.outbound_len(), 1);
    }

    #[test]
    fn ack_resolves_as_delivered() {
        let mut link = Link::new(NodeId::Central, config());
        link.reliable_send(NodeId::Gate, Message::GateLock, 0).unwrap();
        let data = link.take_outbound().unwrap();

        let inbound = link.receive(ack_for(&data));
        assert_eq!(
            inbound,
            Some(Inbound::Outcome(SendOutcome::Delivered {
                to: NodeId::Gate,
                message: Message::GateLock,
                attempts: 1,
            }))
        );
        assert!(!link.is_transmitting());
        assert_eq!(link.next_deadline(), None);
    }

    #[test]
    fn retransmits_then_times_out() {
        let mut link = Link::new(NodeId::Central, config());
        link.reliable_send(NodeId::Door, Message::ReadSensor, 0).unwrap();
        assert!(link.take_outbound().is_some());

        assert_eq!(link.poll(99), None);
        assert_eq!(link.poll(100), None);
        assert_eq!(link.pending().unwrap().attempts, 2);
        assert!(link.take_outbound().is_some());

        assert_eq!(link.poll(200), None);
        assert_eq!(link.pending().unwrap().attempts, 3);
        assert!(link.take_outbound().is_some());

        assert_eq!(
            link.poll(300),
            Some(SendOutcome::TimedOut {
                to: NodeId::Door,
                message: Message::ReadSensor,
                attempts: 3,
            })
        );
        assert!(link.take_outbound().is_none());
        assert!(!link.is_transmitting());
    }

    #[test]
    fn receiver_acks_every_copy() {
        let mut sender = Link::new(NodeId::Door, config());
        let mut receiver = Link::new(NodeId::Central, config());
        sender.reliable_send(NodeId::Central, Message::Stop, 0).unwrap();
        let data = sender.take_outbound().unwrap();

        for _ in 0..2 {
            let inbound = receiver.receive(data.clone());
            assert!(matches!(inbound, Some(Inbound::Payload { from: NodeId::Door, .. })));
            let ack = receiver.take_outbound().unwrap();
            assert_eq!(ack.kind, FrameKind::Ack { seq: 0 });
            assert_eq!(ack.to, Some(NodeId::Door));
        }
    }

    #[test]
    fn stale_ack_is_ignored() {
        let mut link = Link::new(NodeId::Central, config());
        link.reliable_send(NodeId::Gate, Message::GateLock, 0).unwrap();
        let stale = Frame {
            from: NodeId::Gate,
            to: Some(NodeId::Central),
            kind: FrameKind::Ack { seq: 42 },
            payload: Payload::new(),
        };
        assert_eq!(link.receive(stale), None);
        assert!(link.is_transmitting());
    }

    #[test]
    fn frames_for_other_nodes_are_ignored() {
        let mut link = Link::new(NodeId::Kitchen, config());
        let frame = Frame {
            from: NodeId::Central,
            to: Some(NodeId::Gate),
            kind: FrameKind::Data { seq: 0 },
            payload: Message::GateLock.encode().unwrap(),
        };
        assert_eq!(link.receive(frame), None);
        assert_eq!(link.outbound_len(), 0);
    }

    #[test]
    fn sequence_numbers_advance() {
        let mut link = Link::new(NodeId::Central, config());
        link.reliable_send(NodeId::Gate, Message::GateLock, 0).unwrap();
        let first = link.take_outbound().unwrap();
        link.receive(ack_for(&first));
        link.reliable_send(NodeId::Gate, Message::GateUnlock, 5).unwrap();
        let second = link.take_outbound().unwrap();
        assert_eq!(first.kind, FrameKind::Data { seq: 0 });
        assert_eq!(second.kind, FrameKind::Data { seq: 1 });
    }
}
