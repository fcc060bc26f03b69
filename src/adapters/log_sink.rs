//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing node events to the `log` facade
//! (the console through `env_logger` in the simulator).  A GUI or a
//! network bridge would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u64,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events logged so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.emitted += 1;
        match event {
            AppEvent::AvailableCommands(_) => info!("MENU  | {}", event),
            AppEvent::InvalidCommand(_) | AppEvent::CommandDropped => {
                warn!("CMD   | {}", event)
            }
            AppEvent::CommandAccepted(_) | AppEvent::ThresholdForwarded(_) => {
                info!("CMD   | {}", event)
            }
            AppEvent::FireAlarm { .. } => warn!("FIRE  | {}", event),
            AppEvent::LightReport(_)
            | AppEvent::TemperatureReport(_)
            | AppEvent::AutoOpenFinished { .. } => info!("RPT   | {}", event),
            AppEvent::TransportBusy { .. } | AppEvent::TransmissionTimedOut { .. } => {
                warn!("LINK  | {}", event)
            }
            AppEvent::Started(_) => info!("START | {}", event),
            _ => info!("NODE  | {}", event),
        }
    }
}
