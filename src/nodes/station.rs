//! Station runtime — one node with its mailbox, link and LEDs.
//!
//! ```text
//!            ┌────────────────────── Station<N> ──────────────────────┐
//!  timers ──▶│ N::on_timer ──┐                                        │
//!  button ──▶│ N::on_button ─┼──▶ Mailbox<N::Event> ──▶ N::handle ──▶ │──▶ Link outbox
//!  frames ──▶│ Link ─────────┘        (FIFO)            (NodeIo)      │──▶ LEDs, sink
//!            └────────────────────────────────────────────────────────┘
//! ```
//!
//! Timer, button and link callbacks run the node's helpers and post events;
//! only [`Node::handle`] (the primary routine) changes the status word.

use core::fmt;

use log::{debug, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EntropyPort, EventSink, IndicatorPort, SensorPort};
use crate::config::LinkConfig;
use crate::drivers::leds::{LedBank, LedState};
use crate::error::TransportError;
use crate::events::Mailbox;
use crate::scheduler::{Millis, earliest};
use crate::transport::NodeId;
use crate::transport::link::{Frame, Inbound, Link, SendOutcome};
use crate::transport::radio::Channels;
use crate::transport::wire::Message;

/// Collaborators shared by every station of a network.
pub struct Env<'a> {
    pub sensors: &'a mut dyn SensorPort,
    pub entropy: &'a mut dyn EntropyPort,
    pub sink: &'a mut dyn EventSink,
}

/// Everything a node may touch while it runs.
pub struct NodeIo<'a> {
    pub now: Millis,
    pub node: NodeId,
    pub link: &'a mut Link,
    pub leds: &'a mut dyn IndicatorPort,
    pub sensors: &'a mut dyn SensorPort,
    pub entropy: &'a mut dyn EntropyPort,
    pub sink: &'a mut dyn EventSink,
}

impl NodeIo<'_> {
    pub fn emit(&mut self, event: AppEvent) {
        self.sink.emit(&event);
    }

    /// Best-effort broadcast.  Returns `false` if the frame was not queued.
    pub fn broadcast(&mut self, message: Message) -> bool {
        match self.link.broadcast(message) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}: broadcast {} failed: {}", self.node.name(), message, e);
                false
            }
        }
    }

    /// Start a reliable send.  A busy link is reported to the operator.
    pub fn reliable_send(&mut self, to: NodeId, message: Message) -> Result<(), TransportError> {
        let result = self.link.reliable_send(to, message, self.now);
        if let Err(e) = result {
            warn!("{}: cannot send {} to {}: {}", self.node.name(), message, to.name(), e);
            if e == TransportError::Busy {
                self.emit(AppEvent::TransportBusy {
                    node: self.node,
                    message,
                });
            }
        }
        result
    }
}

/// A node's behaviour: helper callbacks plus the primary routine.
pub trait Node {
    type Event: fmt::Debug;

    fn id(&self) -> NodeId;

    /// Radio channels the node listens on.
    fn channels(&self) -> Channels;

    /// Initial LEDs, helpers and greeting.
    fn start(&mut self, io: &mut NodeIo<'_>);

    /// Earliest helper or timer deadline.
    fn next_deadline(&self) -> Option<Millis>;

    /// Run helpers whose timers expired at `io.now`.
    fn on_timer(&mut self, io: &mut NodeIo<'_>, mailbox: &Mailbox<Self::Event>);

    fn on_button(&mut self, io: &mut NodeIo<'_>, mailbox: &Mailbox<Self::Event>);

    /// Map an inbound message to an event, `None` to ignore it.
    fn on_message(&mut self, from: NodeId, message: Message) -> Option<Self::Event>;

    /// Map a reliable-send outcome to an event, `None` to ignore it.
    fn on_send_outcome(&mut self, outcome: SendOutcome) -> Option<Self::Event>;

    /// Primary routine: handle one event.
    fn handle(&mut self, event: Self::Event, io: &mut NodeIo<'_>);
}

/// Object-safe view of a station, used by the network to drive stations
/// of different node types uniformly.
pub trait Endpoint {
    fn id(&self) -> NodeId;
    fn channels(&self) -> Channels;
    fn start(&mut self, now: Millis, env: &mut Env<'_>);
    fn next_deadline(&self) -> Option<Millis>;
    fn fire_timers(&mut self, now: Millis, env: &mut Env<'_>);
    fn press_button(&mut self, now: Millis, env: &mut Env<'_>);
    fn receive(&mut self, frame: Frame);
    /// Drain the mailbox.  Returns the number of events handled.
    fn process(&mut self, now: Millis, env: &mut Env<'_>) -> usize;
    fn take_outbound(&mut self) -> Option<Frame>;
    fn led_state(&self) -> LedState;
    fn pending_events(&self) -> usize;
}

pub struct Station<N: Node> {
    node: N,
    mailbox: Mailbox<N::Event>,
    link: Link,
    leds: LedBank,
}

impl<N: Node> Station<N> {
    pub fn new(node: N, link: LinkConfig) -> Self {
        let id = node.id();
        Self {
            node,
            mailbox: Mailbox::new(),
            link: Link::new(id, link),
            leds: LedBank::new(),
        }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn leds(&self) -> &LedBank {
        &self.leds
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn mailbox(&self) -> &Mailbox<N::Event> {
        &self.mailbox
    }

    /// Post an event from outside the node (e.g. operator input).
    pub fn post(&self, event: N::Event) -> bool {
        self.mailbox.post(event)
    }

    fn parts<'s>(
        &'s mut self,
        now: Millis,
        env: &'s mut Env<'_>,
    ) -> (&'s mut N, &'s Mailbox<N::Event>, NodeIo<'s>) {
        let io = NodeIo {
            now,
            node: self.link.node(),
            link: &mut self.link,
            leds: &mut self.leds,
            sensors: &mut *env.sensors,
            entropy: &mut *env.entropy,
            sink: &mut *env.sink,
        };
        (&mut self.node, &self.mailbox, io)
    }

    fn post_outcome(&mut self, outcome: SendOutcome) {
        if let Some(event) = self.node.on_send_outcome(outcome) {
            self.mailbox.post(event);
        }
    }
}

impl<N: Node> Endpoint for Station<N> {
    fn id(&self) -> NodeId {
        self.node.id()
    }

    fn channels(&self) -> Channels {
        self.node.channels()
    }

    fn start(&mut self, now: Millis, env: &mut Env<'_>) {
        let (node, _, mut io) = self.parts(now, env);
        node.start(&mut io);
        io.emit(AppEvent::Started(io.node));
    }

    fn next_deadline(&self) -> Option<Millis> {
        earliest([self.node.next_deadline(), self.link.next_deadline()])
    }

    fn fire_timers(&mut self, now: Millis, env: &mut Env<'_>) {
        if let Some(outcome) = self.link.poll(now) {
            self.post_outcome(outcome);
        }
        let (node, mailbox, mut io) = self.parts(now, env);
        node.on_timer(&mut io, mailbox);
    }

    fn press_button(&mut self, now: Millis, env: &mut Env<'_>) {
        let (node, mailbox, mut io) = self.parts(now, env);
        node.on_button(&mut io, mailbox);
    }

    fn receive(&mut self, frame: Frame) {
        match self.link.receive(frame) {
            Some(Inbound::Payload { from, payload }) => match Message::decode(&payload) {
                Ok(message) => {
                    if let Some(event) = self.node.on_message(from, message) {
                        self.mailbox.post(event);
                    }
                }
                Err(e) => debug!(
                    "{}: undecodable payload from {}: {}",
                    self.node.id().name(),
                    from.name(),
                    e
                ),
            },
            Some(Inbound::Outcome(outcome)) => self.post_outcome(outcome),
            None => {}
        }
    }

    fn process(&mut self, now: Millis, env: &mut Env<'_>) -> usize {
        let (node, mailbox, mut io) = self.parts(now, env);
        mailbox.drain(|event| {
            debug!("{}: handling {:?}", io.node.name(), event);
            node.handle(event, &mut io);
        })
    }

    fn take_outbound(&mut self) -> Option<Frame> {
        self.link.take_outbound()
    }

    fn led_state(&self) -> LedState {
        self.leds.state()
    }

    fn pending_events(&self) -> usize {
        self.mailbox.len()
    }
}
