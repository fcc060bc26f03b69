//! Per-node event mailboxes.
//!
//! Events are produced by:
//! - Helper routines (blink ticks, humidity steps, camera verdicts)
//! - The node's own timers and its button
//! - The link (inbound messages, reliable-send outcomes)
//!
//! Events are consumed by the node's primary routine, one at a time in
//! FIFO order, when the network drains the mailbox.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Helpers     │────▶│              │     │              │
//! │ Timers      │────▶│   Mailbox    │────▶│   Primary    │
//! │ Button      │────▶│  (bounded)   │     │   routine    │
//! │ Link        │────▶│              │     │              │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

/// Maximum number of pending events per node.
pub const MAILBOX_DEPTH: usize = 16;

/// Bounded FIFO of events for one node.
///
/// Posting never blocks: a full mailbox drops the event and counts it.
/// The mailbox lives inside a single station, so no locking is needed.
pub struct Mailbox<E> {
    channel: Channel<NoopRawMutex, E, MAILBOX_DEPTH>,
    dropped: Cell<u32>,
}

impl<E> Mailbox<E> {
    pub fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: Cell::new(0),
        }
    }

    /// Queue an event.  Returns `false` if the mailbox is full and the
    /// event was dropped.
    pub fn post(&self, event: E) -> bool {
        match self.channel.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.set(self.dropped.get().saturating_add(1));
                warn!("Mailbox full: event dropped ({} total)", self.dropped.get());
                false
            }
        }
    }

    /// Pop the next event in FIFO order.
    pub fn next(&self) -> Option<E> {
        self.channel.try_receive().ok()
    }

    /// Drain all pending events into a callback.
    ///
    /// Events posted by the callback itself are drained too.
    pub fn drain(&self, mut handler: impl FnMut(E)) -> usize {
        let mut handled = 0;
        while let Some(event) = self.next() {
            handler(event);
            handled += 1;
        }
        handled
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }

    /// Events dropped because the mailbox was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.get()
    }
}

impl<E> Default for Mailbox<E> {
    fn default() -> Self {
        Self::new()
    }
}
